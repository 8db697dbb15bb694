use alloc::{string::String, vec::Vec};
use core::fmt::{Display, Write};

use crate::pack::PackedBitmap;

const BYTES_PER_LINE: usize = 16;
const POINTERS_PER_LINE: usize = 5;
const DIMENSIONS_PER_LINE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBitmap {
    pub identifier: String,
    /// File name or frame label shown in the size comment.
    pub source: Option<String>,
    pub bitmap: PackedBitmap,
}

impl NamedBitmap {
    fn label(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.identifier)
    }
}

/// Everything needed to render one `.h` / `.c` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportDocument {
    pub name: String,
    pub timestamp: Option<String>,
    pub bitmaps: Vec<NamedBitmap>,
    pub emit_header: bool,
    pub emit_pointer_table: bool,
    pub frame_delay_ms: Option<u32>,
}

impl ExportDocument {
    pub fn guard(&self) -> String {
        header_guard(&self.name)
    }
}

/// `images` -> `IMAGES_H`, `logo-1` -> `LOGO_1_H`, `2x` -> `_2X_H`.
pub fn header_guard(name: &str) -> String {
    let mut guard = String::with_capacity(name.len() + 3);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        guard.push('_');
    }
    guard.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    if guard.is_empty() {
        guard.push_str("IMAGES");
    }
    guard.push_str("_H");
    guard
}

/// Render a document as C source (or a header when `emit_header` is set).
pub fn emit(document: &ExportDocument) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render(document, &mut out);
    out
}

fn render(document: &ExportDocument, out: &mut String) -> core::fmt::Result {
    writeln!(out, "// Generated by oledpack")?;
    if let Some(timestamp) = &document.timestamp {
        writeln!(out, "// Generated at: {timestamp}")?;
    }
    writeln!(out, "// Encoding: UTF-8")?;
    writeln!(out)?;

    let guard = document.guard();
    if document.emit_header {
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        writeln!(out, "#include <stdint.h>")?;
        writeln!(out)?;
    }

    for named in &document.bitmaps {
        let bitmap = &named.bitmap;
        writeln!(
            out,
            "// Image: {}, size: {}x{} pixels",
            named.label(),
            bitmap.width(),
            bitmap.height()
        )?;
        if document.emit_header {
            writeln!(out, "extern const unsigned char {}[];", named.identifier)?;
        } else {
            writeln!(out, "const unsigned char {}[] = {{", named.identifier)?;
            let literals = bitmap.bytes().iter().map(|byte| HexByte(*byte));
            write_wrapped(out, literals, BYTES_PER_LINE)?;
            writeln!(out, "}};")?;
            writeln!(out)?;
        }
    }

    let count = document.bitmaps.len();
    if document.emit_pointer_table && count > 0 {
        if document.emit_header {
            writeln!(out)?;
        }
        writeln!(out, "// Pointer table of all images")?;
        if document.emit_header {
            writeln!(
                out,
                "extern const unsigned char* const image_array[{count}];"
            )?;
        } else {
            writeln!(out, "const unsigned char* const image_array[{count}] = {{")?;
            let names = document.bitmaps.iter().map(|b| b.identifier.as_str());
            write_wrapped(out, names, POINTERS_PER_LINE)?;
            writeln!(out, "}};")?;
        }
        writeln!(out)?;

        writeln!(out, "// Image dimensions")?;
        if document.emit_header {
            writeln!(out, "extern const uint16_t image_widths[{count}];")?;
            writeln!(out, "extern const uint16_t image_heights[{count}];")?;
        } else {
            writeln!(out, "const uint16_t image_widths[{count}] = {{")?;
            let widths = document.bitmaps.iter().map(|b| b.bitmap.width());
            write_wrapped(out, widths, DIMENSIONS_PER_LINE)?;
            writeln!(out, "}};")?;
            writeln!(out, "const uint16_t image_heights[{count}] = {{")?;
            let heights = document.bitmaps.iter().map(|b| b.bitmap.height());
            write_wrapped(out, heights, DIMENSIONS_PER_LINE)?;
            writeln!(out, "}};")?;
        }
        writeln!(out)?;

        writeln!(out, "// Image count")?;
        writeln!(out, "#define IMAGE_COUNT {count}")?;

        if let Some(delay) = document.frame_delay_ms {
            writeln!(out)?;
            writeln!(out, "// Frame delay (ms per frame)")?;
            writeln!(out, "#define FRAME_DELAY {delay}")?;
        }
    }

    if document.emit_header {
        writeln!(out)?;
        writeln!(out, "#endif // {guard}")?;
    }
    Ok(())
}

struct HexByte(u8);

impl Display for HexByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Tab-indented, `per_line` entries per line, no trailing comma.
fn write_wrapped<T: Display>(
    out: &mut String,
    items: impl Iterator<Item = T>,
    per_line: usize,
) -> core::fmt::Result {
    let mut column = 0;
    let mut any = false;
    for item in items {
        if !any {
            out.push('\t');
        } else if column == per_line {
            out.push_str(",\n\t");
            column = 0;
        } else {
            out.push_str(", ");
        }
        write!(out, "{item}")?;
        column += 1;
        any = true;
    }
    if any {
        out.push('\n');
    }
    Ok(())
}
