//! Standard Type 1 faces used by the report and their advance widths.
//!
//! Widths are in 1/1000 em, taken from the Adobe core font metrics for the
//! printable ASCII range. In the upper half of Windows-1252, accented letters
//! take the width of their base letter.

use super::encoding::WinAnsiText;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

enum Upper {
    Width(u16),
    BoldWidth(u16, u16),
    LikeAscii(u8),
}

fn upper_half(byte: u8) -> Upper {
    use Upper::*;
    match byte {
        0x80 | 0x83 | 0x86 | 0x87 | 0x96 | 0xA2..=0xA5 | 0xA7 | 0xAB | 0xBB => Width(556),
        0x82 | 0x91 | 0x92 => BoldWidth(222, 278),
        0x84 | 0x93 | 0x94 => BoldWidth(333, 500),
        0x85 | 0x89 | 0x8C | 0x97 | 0x99 | 0xC6 => Width(1000),
        0x88 | 0x8B | 0x98 | 0x9B | 0xA1 | 0xA8 | 0xAD | 0xAF | 0xB2..=0xB4 | 0xB8 | 0xB9 => {
            Width(333)
        }
        0x8A => LikeAscii(b'S'),
        0x8E => LikeAscii(b'Z'),
        0x95 => Width(350),
        0x9A => LikeAscii(b's'),
        0x9C => BoldWidth(944, 944),
        0x9E => LikeAscii(b'z'),
        0x9F | 0xDD => LikeAscii(b'Y'),
        0xA0 | 0xB7 => Width(278),
        0xA6 => BoldWidth(260, 280),
        0xA9 | 0xAE => Width(737),
        0xAA => Width(370),
        0xAC | 0xB1 | 0xD7 | 0xF7 => Width(584),
        0xB0 => Width(400),
        0xB5 => BoldWidth(556, 611),
        0xB6 => BoldWidth(537, 556),
        0xBA => Width(365),
        0xBC..=0xBE => Width(834),
        0xBF | 0xDF => BoldWidth(611, 611),
        0xC0..=0xC5 => LikeAscii(b'A'),
        0xC7 => LikeAscii(b'C'),
        0xC8..=0xCB => LikeAscii(b'E'),
        0xCC..=0xCF => LikeAscii(b'I'),
        0xD0 => LikeAscii(b'D'),
        0xD1 => LikeAscii(b'N'),
        0xD2..=0xD6 | 0xD8 => LikeAscii(b'O'),
        0xD9..=0xDC => LikeAscii(b'U'),
        0xDE => LikeAscii(b'P'),
        0xE0..=0xE5 => LikeAscii(b'a'),
        0xE6 => BoldWidth(889, 889),
        0xE7 => LikeAscii(b'c'),
        0xE8..=0xEB => LikeAscii(b'e'),
        0xEC..=0xEF => Width(278),
        0xF0 | 0xF2..=0xF6 | 0xF8 => LikeAscii(b'o'),
        0xF1 => LikeAscii(b'n'),
        0xF9..=0xFC => LikeAscii(b'u'),
        0xFD | 0xFF => LikeAscii(b'y'),
        0xFE => LikeAscii(b'p'),
        _ => Width(556),
    }
}

impl FontFace {
    pub const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Italic];

    /// Name the face is registered under in the page resources.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Italic => "Helvetica-Oblique",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold)
    }

    fn ascii_width(self, byte: u8) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD
        } else {
            &HELVETICA
        };
        table
            .get(usize::from(byte.saturating_sub(0x20)))
            .copied()
            .unwrap_or(556)
    }

    /// Advance width of one encoded byte in 1/1000 em.
    pub fn glyph_width(self, byte: u8) -> u16 {
        match byte {
            0x20..=0x7E => self.ascii_width(byte),
            0x80..=0xFF => match upper_half(byte) {
                Upper::Width(width) => width,
                Upper::BoldWidth(regular, bold) => {
                    if self.is_bold() {
                        bold
                    } else {
                        regular
                    }
                }
                Upper::LikeAscii(base) => self.ascii_width(base),
            },
            _ => 0,
        }
    }

    /// Width of `text` set at `size_pt`, in millimetres.
    pub fn text_width_mm(self, text: &WinAnsiText, size_pt: f32) -> f32 {
        let units: u32 = text
            .as_bytes()
            .iter()
            .map(|byte| u32::from(self.glyph_width(*byte)))
            .sum();
        units as f32 * size_pt / 1000.0 * 25.4 / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_widths_match_core_metrics() {
        assert_eq!(FontFace::Regular.glyph_width(b' '), 278);
        assert_eq!(FontFace::Regular.glyph_width(b'W'), 944);
        assert_eq!(FontFace::Regular.glyph_width(b'i'), 222);
        assert_eq!(FontFace::Bold.glyph_width(b'i'), 278);
        assert_eq!(FontFace::Bold.glyph_width(b'@'), 975);
        assert_eq!(FontFace::Italic.glyph_width(b'~'), 584);
    }

    #[test]
    fn accented_letters_use_base_width() {
        assert_eq!(FontFace::Regular.glyph_width(0xE9), FontFace::Regular.glyph_width(b'e'));
        assert_eq!(FontFace::Bold.glyph_width(0xC5), FontFace::Bold.glyph_width(b'A'));
        assert_eq!(FontFace::Regular.glyph_width(0x97), 1000);
    }

    #[test]
    fn text_width_scales_with_size() {
        let text = WinAnsiText::encode("test", "0000").unwrap();
        let at_ten = FontFace::Regular.text_width_mm(&text, 10.0);
        let at_twenty = FontFace::Regular.text_width_mm(&text, 20.0);
        assert!((at_ten - 4.0 * 5.56 * 25.4 / 72.0).abs() < 1e-3);
        assert!((at_twenty - 2.0 * at_ten).abs() < 1e-3);
    }
}
