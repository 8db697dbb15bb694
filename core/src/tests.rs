#![cfg_attr(rustfmt, rustfmt_skip)]
extern crate std;

use alloc::{format, string::{String, ToString}, vec::Vec};

use super::*;

fn checker(width: u32, height: u32, seed: u32) -> RasterFrame {
    let samples = (0..width * height)
        .map(|i| ((i.wrapping_mul(2654435761).wrapping_add(seed)) >> 7) as u8)
        .collect();
    RasterFrame::from_luma(width, height, samples).unwrap()
}

fn batch(count: u32) -> Vec<RasterFrame> {
    (0..count)
        .map(|i| checker(13 + i, 9, i).with_source(format!("img{i}.png")))
        .collect()
}

fn convert(frames: Vec<RasterFrame>, config: &ConversionConfig, header: bool) -> String {
    let export = ExportOptions {
        name: "anim".to_string(),
        emit_header: header,
        emit_pointer_table: true,
        frame_delay_ms: Some(80),
        timestamp: None,
    };
    let document = BatchPipeline::new(config, &export, NearestNeighbor)
        .run(frames, |_| {})
        .unwrap();
    emit(&document)
}

/// Lines between `start` and the closing `};`.
fn block<'a>(text: &'a str, start: &str) -> Vec<&'a str> {
    text.lines()
        .skip_while(|line| !line.starts_with(start))
        .skip(1)
        .take_while(|line| *line != "};")
        .collect()
}

#[test]
fn conversion_is_deterministic() {
    let config = ConversionConfig { layout: Layout::Vertical, ..Default::default() };
    let first = convert(batch(7), &config, false);
    let second = convert(batch(7), &config, false);
    assert_eq!(first, second);
}

#[test]
fn every_byte_is_emitted_once() {
    for layout in [Layout::Horizontal, Layout::Vertical] {
        let config = ConversionConfig { layout, ..Default::default() };
        let frames = batch(3);
        let expected: Vec<usize> = frames
            .iter()
            .map(|f| PackedBitmap::expected_len(f.width(), f.height(), layout))
            .collect();
        let text = convert(frames, &config, false);
        for (index, len) in expected.into_iter().enumerate() {
            let lines = block(&text, &format!("const unsigned char frame_{index:03}[]"));
            let tokens: Vec<&str> = lines
                .iter()
                .flat_map(|line| line.trim().split(", "))
                .map(|token| token.trim_end_matches(','))
                .collect();
            assert_eq!(tokens.len(), len);
            assert!(tokens.iter().all(|t| t.len() == 4 && t.starts_with("0x")));
            assert!(lines.iter().all(|line| line.matches("0x").count() <= 16));
            assert!(!lines.last().unwrap().ends_with(','));
        }
    }
}

#[test]
fn pointer_table_matches_input_order() {
    let config = ConversionConfig { name_prefix: "clip".to_string(), ..Default::default() };
    let text = convert(batch(12), &config, false);
    let pointers: Vec<String> = block(&text, "const unsigned char* const image_array[12]")
        .iter()
        .flat_map(|line| line.trim().split(','))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("clip_{i:03}")).collect();
    assert_eq!(pointers, expected);
    assert!(text.contains("#define IMAGE_COUNT 12\n"));
    assert!(text.contains("#define FRAME_DELAY 80\n"));

    let widths = block(&text, "const uint16_t image_widths[12]");
    assert_eq!(widths, ["\t13, 14, 15, 16, 17, 18, 19, 20,", "\t21, 22, 23, 24"]);
}

#[test]
fn header_declares_every_bitmap() {
    let text = convert(batch(3), &ConversionConfig::default(), true);
    for i in 0..3 {
        assert!(text.contains(&format!("// Image: img{i}.png, size: {}x9 pixels\nextern const unsigned char frame_{i:03}[];\n", 13 + i)));
    }
    assert!(!text.contains("0x"));
    assert!(text.starts_with("// Generated by oledpack\n"));
    assert!(text.ends_with("#endif // ANIM_H\n"));
}

#[test]
fn settings_drive_a_full_conversion() {
    let settings = Settings::parse("[Settings]\nprefix=logo\nresize=1\nwidth=16\nheight=8\nmode=vertical\nthreshold=1\n").unwrap();
    let config = settings.conversion_config().unwrap();
    let export = settings.export_options("logo");
    let frame = RasterFrame::from_rgb(4, 4, [255u8, 255, 255].repeat(16)).unwrap();
    let document = BatchPipeline::new(&config, &export, NearestNeighbor)
        .run([frame], |_| {})
        .unwrap();
    let bitmap = &document.bitmaps[0].bitmap;
    assert_eq!(bitmap.bytes(), &[0xFF; 16]);
    assert_eq!(bitmap.layout(), Layout::Vertical);
    let text = emit(&document);
    assert!(text.contains("const unsigned char logo_000[] = {\n\t0xff, 0xff"));
}
