//! # PDF Serializer
//!
//! Takes composed pages from the layout module and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. We write the raw bytes ourselves
//! because it keeps the generator self-contained and gives full control
//! over font embedding, which off-the-shelf minimal writers tend to fumble
//! for CJK text. The PDF spec is verbose but the subset a booklet needs is
//! manageable.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (font chain, images, pages, streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Text uses a single embedded TrueType face as a CIDFontType2 under
//! Identity-H encoding: content streams address glyphs by glyph ID in hex
//! runs, which sidesteps every 8-bit encoding limitation Japanese text
//! would otherwise hit. Photos embed as image XObjects; JPEG bytes pass
//! through with DCTDecode, decoded pixels deflate with an optional SMask
//! alpha channel.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::BookletFont;
use crate::image_loader::{EmbeddableImage, ImagePixelData, JpegColorSpace};
use crate::layout::{DrawOp, Page};
use crate::theme::Color;

pub struct PdfWriter<'a> {
    font: &'a BookletFont,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    #[allow(dead_code)]
    id: usize,
    data: Vec<u8>,
}

impl PdfBuilder {
    fn add(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { id, data });
        id
    }

    /// Stream object: caller supplies the extra dictionary entries and the
    /// final payload; /Length is filled in here.
    fn add_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::with_capacity(payload.len() + 64);
        let _ = write!(
            data,
            "<< {} /Length {} >>\nstream\n",
            dict_entries,
            payload.len()
        );
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.add(data)
    }
}

impl<'a> PdfWriter<'a> {
    pub fn new(font: &'a BookletFont) -> Self {
        Self { font }
    }

    /// Write composed pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], title: &str) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = font chain, then per-page images, content streams, pages
        builder.objects.push(PdfObject { id: 0, data: vec![] });
        builder.objects.push(PdfObject { id: 1, data: vec![] });
        builder.objects.push(PdfObject { id: 2, data: vec![] });

        let font_obj_id = self.embed_font(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let (content, xobjects) = self.build_content_stream(&mut builder, page);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.add_stream("/Filter /FlateDecode", &compressed);

            let mut resources = format!("/Font << /F0 {} 0 R >>", font_obj_id);
            if !xobjects.is_empty() {
                let entries: String = xobjects
                    .iter()
                    .map(|(name, id)| format!("/{} {} 0 R", name, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", entries);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.add(page_dict.into_bytes()));
        }

        // Write Catalog (object 1)
        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Write Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        // Info dictionary
        let mut info = String::from("<< ");
        let _ = write!(info, "/Title {} ", pdf_text_string(title));
        let _ = write!(
            info,
            "/Producer (hibinote {}) /Creator (hibinote) >>",
            env!("CARGO_PKG_VERSION")
        );
        let info_obj_id = builder.add(info.into_bytes());

        self.serialize(&builder, info_obj_id)
    }

    /// Build the content stream for one page, registering image XObjects
    /// as they are encountered. Layout coordinates run top-down; PDF's
    /// origin is the bottom-left corner, so every y flips here.
    fn build_content_stream(
        &self,
        builder: &mut PdfBuilder,
        page: &Page,
    ) -> (String, Vec<(String, usize)>) {
        let mut stream = String::new();
        let mut xobjects: Vec<(String, usize)> = Vec::new();
        let page_height = page.height;

        for op in &page.ops {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    if color.a > 0.0 {
                        let pdf_y = page_height - y - height;
                        let _ = write!(
                            stream,
                            "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                            color.r, color.g, color.b, x, pdf_y, width, height
                        );
                    }
                }

                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    thickness,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        thickness,
                        x1,
                        page_height - y1,
                        x2,
                        page_height - y2
                    );
                }

                DrawOp::Text {
                    x,
                    baseline,
                    size,
                    color,
                    content,
                } => {
                    self.write_text(&mut stream, page_height, *x, *baseline, *size, color, content);
                }

                DrawOp::Image {
                    x,
                    y,
                    width,
                    height,
                    image,
                } => {
                    let image_obj_id = self.embed_image(builder, image);
                    let name = format!("Im{}", image_obj_id);
                    let pdf_y = page_height - y - height;
                    let _ = write!(
                        stream,
                        "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
                        width, height, x, pdf_y, name
                    );
                    xobjects.push((name, image_obj_id));
                }
            }
        }

        (stream, xobjects)
    }

    /// One text run as a hex glyph string. Characters the face does not
    /// cover map to glyph 0; the composer's sanitizer keeps that from
    /// happening in practice.
    #[allow(clippy::too_many_arguments)]
    fn write_text(
        &self,
        stream: &mut String,
        page_height: f64,
        x: f64,
        baseline: f64,
        size: f64,
        color: &Color,
        content: &str,
    ) {
        let mut glyphs = String::with_capacity(content.len() * 4);
        for ch in content.chars() {
            let gid = self.font.glyph_id(ch).unwrap_or(0);
            let _ = write!(glyphs, "{:04X}", gid);
        }
        if glyphs.is_empty() {
            return;
        }

        let _ = write!(
            stream,
            "BT\n/F0 {:.1} Tf\n{:.3} {:.3} {:.3} rg\n1 0 0 1 {:.2} {:.2} Tm\n<{}> Tj\nET\n",
            size,
            color.r,
            color.g,
            color.b,
            x,
            page_height - baseline,
            glyphs
        );
    }

    /// Embed one photo placement as an image XObject and return its id.
    fn embed_image(&self, builder: &mut PdfBuilder, image: &EmbeddableImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let cs = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, cs
                );
                builder.add_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        image.width_px, image.height_px
                    );
                    builder.add_stream(&dict, &compressed)
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let mut dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode",
                    image.width_px, image.height_px
                );
                if let Some(id) = smask_id {
                    let _ = write!(dict, " /SMask {} 0 R", id);
                }
                builder.add_stream(&dict, &compressed)
            }
        }
    }

    /// Embed the full face as a CIDFontType2 chain and return the Type0
    /// font object id the pages reference as /F0.
    ///
    /// The /W array lists the advance of every glyph the document actually
    /// uses (everything else falls back to /DW); ToUnicode maps those
    /// glyphs back to characters so extraction and copy/paste work.
    fn embed_font(&self, builder: &mut PdfBuilder, pages: &[Page]) -> usize {
        let font = self.font;

        // Glyphs actually used, each with a representative character
        let mut used: BTreeMap<u16, char> = BTreeMap::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { content, .. } = op {
                    for ch in content.chars() {
                        if let Some(gid) = font.glyph_id(ch) {
                            used.entry(gid).or_insert(ch);
                        }
                    }
                }
            }
        }

        // Everything below is in 1000-per-em PDF glyph space
        let scale = 1000.0 / font.units_per_em() as f64;
        let em = |v: f64| (v * scale).round() as i64;

        let compressed = compress_to_vec_zlib(font.data(), 6);
        let font_file_id = builder.add_stream(
            &format!("/Filter /FlateDecode /Length1 {}", font.data().len()),
            &compressed,
        );

        let base_name = pdf_name(font.postscript_name().unwrap_or("EmbeddedFont"));
        let bbox = font.bbox();

        let descriptor_id = builder.add(
            format!(
                "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
                 /FontBBox [{} {} {} {}] /ItalicAngle 0 /Ascent {} /Descent {} \
                 /CapHeight {} /StemV 80 /FontFile2 {} 0 R >>",
                base_name,
                em(bbox[0] as f64),
                em(bbox[1] as f64),
                em(bbox[2] as f64),
                em(bbox[3] as f64),
                em(font.ascender() as f64),
                em(font.descender() as f64),
                em(font.cap_height() as f64),
                font_file_id
            )
            .into_bytes(),
        );

        let mut widths = String::new();
        for (gid, ch) in &used {
            let _ = write!(widths, "{} [{}] ", gid, em(font.advance_units(*ch) as f64));
        }

        let cid_font_id = builder.add(
            format!(
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor {} 0 R /DW {} /W [ {}] /CIDToGIDMap /Identity >>",
                base_name,
                descriptor_id,
                em(font.default_advance() as f64),
                widths
            )
            .into_bytes(),
        );

        let to_unicode_id = build_to_unicode(builder, &used);

        builder.add(
            format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /{} /Encoding /Identity-H \
                 /DescendantFonts [{} 0 R] /ToUnicode {} 0 R >>",
                base_name, cid_font_id, to_unicode_id
            )
            .into_bytes(),
        )
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for i in 1..builder.objects.len() {
            let _ = write!(output, "{:010} 00000 n \n", offsets[i]);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\n",
            builder.objects.len(),
            info_obj_id
        );
        let _ = write!(output, "startxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

/// ToUnicode CMap stream for the used glyph set, bfchar entries in chunks
/// of at most 100 as the CMap format requires.
fn build_to_unicode(builder: &mut PdfBuilder, used: &BTreeMap<u16, char>) -> usize {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<(u16, char)> = used.iter().map(|(gid, ch)| (*gid, *ch)).collect();
    for chunk in entries.chunks(100) {
        let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let mut target = String::new();
            for unit in ch.encode_utf16(&mut units).iter() {
                let _ = write!(target, "{:04X}", unit);
            }
            let _ = writeln!(cmap, "<{:04X}> <{}>", gid, target);
        }
        let _ = writeln!(cmap, "endbfchar");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");

    let compressed = compress_to_vec_zlib(cmap.as_bytes(), 6);
    builder.add_stream("/Filter /FlateDecode", &compressed)
}

/// A PDF name token: keep ASCII alphanumerics and a few safe symbols.
fn pdf_name(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

/// Metadata string: ASCII as an escaped literal, anything else as
/// UTF-16BE hex with a byte-order mark.
fn pdf_text_string(s: &str) -> String {
    if s.is_ascii() {
        format!("({})", escape_pdf_string(s))
    } else {
        let mut out = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(out, "{:04X}", unit);
        }
        out.push('>');
        out
    }
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
