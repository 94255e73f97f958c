use std::io::{self, Write};

use super::{AudioAsset, Locale};

/// Header providing `CONST` and `BYTE_T` on the firmware side
const TYPES_HEADER: &str = "tuya_cloud_types.h";

/// Writes the header declaring one extern array per asset of `locale`
pub fn write_header<W: Write>(
    writer: &mut W,
    locale: Locale,
    assets: &[AudioAsset],
) -> io::Result<()> {
    let guard = locale.include_guard();

    write!(
        writer,
        "#ifndef {}\n#define {}\n\n#include \"{}\"\n",
        guard, guard, TYPES_HEADER
    )?;

    for asset in assets {
        write!(
            writer,
            "\nextern CONST BYTE_T {}[{}];",
            asset.symbol(),
            asset.data().len()
        )?;
    }

    write!(writer, "\n\n#endif // {}\n", guard)?;

    Ok(())
}

/// Writes the source file defining the arrays of `locale`, one `0xHH` literal per byte
pub fn write_source<W: Write>(
    writer: &mut W,
    locale: Locale,
    assets: &[AudioAsset],
) -> io::Result<()> {
    write!(writer, "#include \"{}\"\n\n", locale.header_name())?;

    for asset in assets {
        writeln!(writer, "// {}", asset.name())?;
        write!(
            writer,
            "CONST BYTE_T {}[{}] = {{\n    ",
            asset.symbol(),
            asset.data().len()
        )?;

        for (i, byte) in asset.data().iter().enumerate() {
            if i > 0 {
                writer.write_all(b", ")?;
            }

            write!(writer, "0x{:02X}", byte)?;
        }

        writer.write_all(b"\n};\n\n")?;
    }

    Ok(())
}

/// Writes `media_src.h`, which includes the header of every locale
pub fn write_umbrella_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(b"#ifndef __MEDIA_SRC_H__\n#define __MEDIA_SRC_H__\n\n")?;

    for locale in Locale::ALL.iter() {
        writeln!(writer, "#include \"{}\"", locale.header_name())?;
    }

    writer.write_all(b"\n#endif // __MEDIA_SRC_H__\n")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_hex::*;
    use hex_literal::hex;

    use super::*;

    fn assets() -> Vec<AudioAsset> {
        vec![
            AudioAsset::new("net-ok_zh", hex!("49 44 33 04 00").to_vec()),
            AudioAsset::new("net-fail_zh", hex!("FF FB 90 0a").to_vec()),
        ]
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf: Vec<u8> = Vec::new();

        f(&mut buf).unwrap();

        String::from_utf8(buf).unwrap()
    }

    /// Parses the `0xHH` literals of every array initializer back into bytes
    fn parse_arrays(source: &str) -> Vec<Vec<u8>> {
        source
            .split("= {")
            .skip(1)
            .map(|rest| {
                let body = &rest[..rest.find("};").unwrap()];

                body.split(',')
                    .map(str::trim)
                    .filter(|literal| !literal.is_empty())
                    .map(|literal| u8::from_str_radix(&literal[2..], 16).unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn it_should_write_header() {
        let header = render(|buf| write_header(buf, Locale::Zh, &assets()));

        assert_eq!(
            header,
            "#ifndef __MEDIA_SRC_ZH_H__\n\
             #define __MEDIA_SRC_ZH_H__\n\
             \n\
             #include \"tuya_cloud_types.h\"\n\
             \n\
             extern CONST BYTE_T media_src_net_ok_zh[5];\n\
             extern CONST BYTE_T media_src_net_fail_zh[4];\n\
             \n\
             #endif // __MEDIA_SRC_ZH_H__\n"
        );
    }

    #[test]
    fn it_should_write_source() {
        let source = render(|buf| write_source(buf, Locale::Zh, &assets()));

        assert_eq!(
            source,
            "#include \"media_src_zh.h\"\n\
             \n\
             // net-ok_zh\n\
             CONST BYTE_T media_src_net_ok_zh[5] = {\n    0x49, 0x44, 0x33, 0x04, 0x00\n};\n\
             \n\
             // net-fail_zh\n\
             CONST BYTE_T media_src_net_fail_zh[4] = {\n    0xFF, 0xFB, 0x90, 0x0A\n};\n\
             \n"
        );
    }

    #[test]
    fn it_should_reproduce_asset_bytes_from_source() {
        let payload: Vec<u8> = (0..=255u8).rev().collect();
        let assets = vec![
            AudioAsset::new("all-bytes_en", payload.clone()),
            AudioAsset::new("single_en", vec![0x7f]),
        ];

        let source = render(|buf| write_source(buf, Locale::En, &assets));
        let arrays = parse_arrays(&source);

        assert_eq!(arrays.len(), 2);
        assert_eq_hex!(arrays[0], payload);
        assert_eq_hex!(arrays[1], vec![0x7fu8]);
    }

    #[test]
    fn it_should_declare_matching_lengths() {
        let assets = assets();
        let header = render(|buf| write_header(buf, Locale::Zh, &assets));
        let source = render(|buf| write_source(buf, Locale::Zh, &assets));
        let arrays = parse_arrays(&source);

        for (asset, array) in assets.iter().zip(arrays.iter()) {
            let declaration = format!("{}[{}];", asset.symbol(), array.len());

            assert!(header.contains(&declaration), "missing {}", declaration);
        }
    }

    #[test]
    fn it_should_include_every_locale_in_umbrella_header() {
        let header = render(|buf| write_umbrella_header(buf));

        assert_eq!(
            header,
            "#ifndef __MEDIA_SRC_H__\n\
             #define __MEDIA_SRC_H__\n\
             \n\
             #include \"media_src_zh.h\"\n\
             #include \"media_src_en.h\"\n\
             \n\
             #endif // __MEDIA_SRC_H__\n"
        );
    }
}
