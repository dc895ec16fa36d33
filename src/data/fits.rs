use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use thiserror::Error;

// ---------------------------------------------------------------------------
// FITS binary tables
// ---------------------------------------------------------------------------
//
// A FITS file is a sequence of HDUs, each made of 2880-byte blocks: a header
// of 80-character cards terminated by `END`, followed by big-endian data
// padded to a block boundary. DOLPHOT catalogs keep their photometry in the
// first `BINTABLE` extension, one scalar column per quantity.

pub const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

#[derive(Debug, Error)]
pub enum FitsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("header ended without an END card")]
    MissingEnd,
    #[error("missing header keyword {0}")]
    MissingKeyword(String),
    #[error("invalid value for {key}: '{value}'")]
    InvalidKeyword { key: String, value: String },
    #[error("no BINTABLE extension found")]
    NoBinaryTable,
    #[error("column {column}: unsupported TFORM '{tform}'")]
    UnsupportedFormat { column: String, tform: String },
    #[error("data unit truncated: {got} of {expected} bytes present")]
    Truncated { expected: u64, got: u64 },
    #[error("column {column} has {got} values, expected {expected}")]
    LengthMismatch {
        column: String,
        got: usize,
        expected: usize,
    },
}

fn invalid(key: &str, value: impl ToString) -> FitsError {
    FitsError::InvalidKeyword {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Keyword/value pairs of one HDU header, in file order.
#[derive(Debug, Clone, Default)]
pub struct Header {
    cards: Vec<(String, String)>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>, FitsError> {
        self.get(key)
            .map(|v| {
                v.parse::<i64>().map_err(|_| FitsError::InvalidKeyword {
                    key: key.to_string(),
                    value: v.to_string(),
                })
            })
            .transpose()
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>, FitsError> {
        self.get(key)
            .map(|v| {
                // Fortran-style exponents are legal in FITS.
                v.replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .map_err(|_| FitsError::InvalidKeyword {
                        key: key.to_string(),
                        value: v.to_string(),
                    })
            })
            .transpose()
    }

    fn require_int(&self, key: &str) -> Result<i64, FitsError> {
        self.get_int(key)?
            .ok_or_else(|| FitsError::MissingKeyword(key.to_string()))
    }

    /// Integer keyword that must be present and non-negative.
    fn require_count(&self, key: &str) -> Result<u64, FitsError> {
        let value = self.require_int(key)?;
        u64::try_from(value).map_err(|_| invalid(key, value))
    }

    /// Like `require_count`, with a default when the keyword is absent.
    fn count_or(&self, key: &str, default: u64) -> Result<u64, FitsError> {
        match self.get_int(key)? {
            Some(value) => u64::try_from(value).map_err(|_| invalid(key, value)),
            None => Ok(default),
        }
    }

    /// Size in bytes of the data unit following this header, before padding.
    fn data_size(&self) -> Result<u64, FitsError> {
        let bitpix = self.require_int("BITPIX")?;
        let bytes_per_value = match bitpix {
            8 | 16 | 32 | 64 | -32 | -64 => bitpix.unsigned_abs() / 8,
            _ => return Err(invalid("BITPIX", bitpix)),
        };
        let naxis = self.count_or("NAXIS", 0)?;
        if naxis > 999 {
            return Err(invalid("NAXIS", naxis));
        }
        if naxis == 0 {
            return Ok(0);
        }

        let mut elements: u64 = 1;
        for i in 1..=naxis {
            let key = format!("NAXIS{i}");
            let n = self.require_count(&key)?;
            elements = elements.checked_mul(n).ok_or_else(|| invalid(&key, n))?;
        }
        let pcount = self.count_or("PCOUNT", 0)?;
        let gcount = self.count_or("GCOUNT", 1)?;
        elements
            .checked_add(pcount)
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bytes_per_value))
            .ok_or_else(|| invalid("NAXIS", elements))
    }

    /// BINTABLE headers carry bytes (BITPIX 8), two axes and one group.
    fn check_binary_table(&self) -> Result<(), FitsError> {
        let bitpix = self.require_int("BITPIX")?;
        if bitpix != 8 {
            return Err(invalid("BITPIX", bitpix));
        }
        let naxis = self.require_int("NAXIS")?;
        if naxis != 2 {
            return Err(invalid("NAXIS", naxis));
        }
        let gcount = self.count_or("GCOUNT", 1)?;
        if gcount != 1 {
            return Err(invalid("GCOUNT", gcount));
        }
        self.count_or("PCOUNT", 0)?;
        Ok(())
    }
}

/// Split one card into keyword and cleaned value. Commentary cards yield `None`.
fn parse_card(card: &str) -> Option<(String, String)> {
    if card.get(8..10) != Some("= ") {
        return None;
    }
    let keyword = card.get(..8)?.trim().to_string();
    let raw = card.get(10..)?.trim_start();

    let value = if let Some(rest) = raw.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote.
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        out.trim_end().to_string()
    } else {
        raw.split('/').next().unwrap_or("").trim().to_string()
    };

    Some((keyword, value))
}

fn read_header<R: Read>(reader: &mut R) -> Result<Option<Header>, FitsError> {
    let mut header = Header::default();
    let mut block = [0u8; BLOCK_SIZE];
    let mut first = true;

    loop {
        match reader.read_exact(&mut block) {
            Ok(()) => {}
            // A clean EOF between HDUs just means there are no more extensions.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && first => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(FitsError::MissingEnd)
            }
            Err(e) => return Err(e.into()),
        }
        first = false;

        for chunk in block.chunks(CARD_SIZE) {
            let card = String::from_utf8_lossy(chunk);
            if card.trim_end() == "END" {
                return Ok(Some(header));
            }
            if let Some(kv) = parse_card(&card) {
                header.cards.push(kv);
            }
        }
    }
}

/// `size` rounded up to a whole number of blocks.
fn padded(size: u64) -> Result<u64, FitsError> {
    let block = BLOCK_SIZE as u64;
    size.div_ceil(block)
        .checked_mul(block)
        .ok_or_else(|| invalid("NAXIS", size))
}

fn skip<R: Read>(reader: &mut R, bytes: u64) -> Result<(), FitsError> {
    let copied = io::copy(&mut reader.take(bytes), &mut io::sink())?;
    if copied < bytes {
        return Err(FitsError::Truncated {
            expected: bytes,
            got: copied,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Column formats
// ---------------------------------------------------------------------------

/// Scalar numeric column types (TFORM letter codes B, I, J, K, E, D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ColumnFormat {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(ColumnFormat::U8),
            'I' => Some(ColumnFormat::I16),
            'J' => Some(ColumnFormat::I32),
            'K' => Some(ColumnFormat::I64),
            'E' => Some(ColumnFormat::F32),
            'D' => Some(ColumnFormat::F64),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            ColumnFormat::U8 => 'B',
            ColumnFormat::I16 => 'I',
            ColumnFormat::I32 => 'J',
            ColumnFormat::I64 => 'K',
            ColumnFormat::F32 => 'E',
            ColumnFormat::F64 => 'D',
        }
    }

    pub fn width(self) -> usize {
        match self {
            ColumnFormat::U8 => 1,
            ColumnFormat::I16 => 2,
            ColumnFormat::I32 | ColumnFormat::F32 => 4,
            ColumnFormat::I64 | ColumnFormat::F64 => 8,
        }
    }

    fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            ColumnFormat::U8 => bytes[0] as f64,
            ColumnFormat::I16 => BigEndian::read_i16(bytes) as f64,
            ColumnFormat::I32 => BigEndian::read_i32(bytes) as f64,
            ColumnFormat::I64 => BigEndian::read_i64(bytes) as f64,
            ColumnFormat::F32 => BigEndian::read_f32(bytes) as f64,
            ColumnFormat::F64 => BigEndian::read_f64(bytes),
        }
    }

    fn encode<W: Write>(self, out: &mut W, value: f64) -> io::Result<()> {
        match self {
            ColumnFormat::U8 => out.write_u8(value as u8),
            ColumnFormat::I16 => out.write_i16::<BigEndian>(value as i16),
            ColumnFormat::I32 => out.write_i32::<BigEndian>(value as i32),
            ColumnFormat::I64 => out.write_i64::<BigEndian>(value as i64),
            ColumnFormat::F32 => out.write_f32::<BigEndian>(value as f32),
            ColumnFormat::F64 => out.write_f64::<BigEndian>(value),
        }
    }
}

/// Parse a TFORM value into (repeat, letter code).
fn parse_tform(tform: &str) -> Option<(usize, char)> {
    let tform = tform.trim();
    let digits: String = tform.chars().take_while(|c| c.is_ascii_digit()).collect();
    let code = tform[digits.len()..].chars().next()?;
    let repeat = if digits.is_empty() {
        1
    } else {
        digits.parse().ok()?
    };
    Some((repeat, code))
}

/// Bytes occupied in a row by a field of any TFORM code.
fn field_width(repeat: usize, code: char) -> Option<usize> {
    let unit: usize = match code {
        'L' | 'B' | 'A' => 1,
        'X' => return Some(repeat.div_ceil(8)),
        'I' => 2,
        'J' | 'E' => 4,
        'K' | 'D' | 'C' | 'P' => 8,
        'M' | 'Q' => 16,
        _ => return None,
    };
    unit.checked_mul(repeat)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One decoded numeric column, already scaled by TSCAL/TZERO.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct BinaryTable {
    pub extname: Option<String>,
    pub num_rows: usize,
    pub columns: Vec<TableColumn>,
}

struct FieldLayout {
    name: String,
    offset: usize,
    format: ColumnFormat,
    scale: f64,
    zero: f64,
}

/// Read the first BINTABLE extension of a FITS stream.
///
/// Scalar numeric fields are decoded; vector, string and logical fields are
/// skipped since they cannot take part in range filtering.
pub fn read_binary_table<R: Read>(mut reader: R) -> Result<BinaryTable, FitsError> {
    let primary = read_header(&mut reader)?.ok_or(FitsError::NoBinaryTable)?;
    if primary.get("SIMPLE") != Some("T") {
        return Err(FitsError::MissingKeyword("SIMPLE".to_string()));
    }
    skip(&mut reader, padded(primary.data_size()?)?)?;

    while let Some(header) = read_header(&mut reader)? {
        if header.get("XTENSION") != Some("BINTABLE") {
            log::debug!(
                "skipping {} extension",
                header.get("XTENSION").unwrap_or("unknown")
            );
            skip(&mut reader, padded(header.data_size()?)?)?;
            continue;
        }

        header.check_binary_table()?;
        let size = header.data_size()?;
        let row_len = usize::try_from(header.require_count("NAXIS1")?)
            .map_err(|_| invalid("NAXIS1", size))?;
        let num_rows = usize::try_from(header.require_count("NAXIS2")?)
            .map_err(|_| invalid("NAXIS2", size))?;
        let table_len = row_len
            .checked_mul(num_rows)
            .filter(|&n| n as u64 <= size)
            .ok_or_else(|| invalid("NAXIS2", num_rows))?;
        let fields = field_layouts(&header, row_len)?;

        let mut data = Vec::new();
        (&mut reader).take(size).read_to_end(&mut data)?;
        if data.len() < table_len {
            return Err(FitsError::Truncated {
                expected: table_len as u64,
                got: data.len() as u64,
            });
        }

        let columns = fields
            .into_iter()
            .map(|f| {
                let values = (0..num_rows)
                    .map(|row| {
                        let start = row * row_len + f.offset;
                        let raw = f.format.decode(&data[start..start + f.format.width()]);
                        raw * f.scale + f.zero
                    })
                    .collect();
                TableColumn {
                    name: f.name,
                    values,
                }
            })
            .collect();

        return Ok(BinaryTable {
            extname: header.get("EXTNAME").map(str::to_string),
            num_rows,
            columns,
        });
    }

    Err(FitsError::NoBinaryTable)
}

/// Field offsets within a row. Every field ends within `row_len`.
fn field_layouts(header: &Header, row_len: usize) -> Result<Vec<FieldLayout>, FitsError> {
    let tfields = header.require_count("TFIELDS")?;
    if tfields > 999 {
        return Err(invalid("TFIELDS", tfields));
    }
    let mut layouts = Vec::new();
    let mut offset = 0usize;

    for i in 1..=tfields {
        let name = header
            .get(&format!("TTYPE{i}"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("COL{i}"));
        let tform = header
            .get(&format!("TFORM{i}"))
            .ok_or_else(|| FitsError::MissingKeyword(format!("TFORM{i}")))?;
        let unsupported = || FitsError::UnsupportedFormat {
            column: name.clone(),
            tform: tform.to_string(),
        };

        let (repeat, code) = parse_tform(tform).ok_or_else(unsupported)?;
        let width = field_width(repeat, code).ok_or_else(unsupported)?;

        match ColumnFormat::from_code(code) {
            Some(format) if repeat == 1 => layouts.push(FieldLayout {
                name: name.clone(),
                offset,
                format,
                scale: header.get_float(&format!("TSCAL{i}"))?.unwrap_or(1.0),
                zero: header.get_float(&format!("TZERO{i}"))?.unwrap_or(0.0),
            }),
            _ => log::debug!("skipping non-scalar column {name} ({tform})"),
        }
        offset = offset
            .checked_add(width)
            .filter(|&end| end <= row_len)
            .ok_or_else(|| invalid("NAXIS1", row_len))?;
    }
    Ok(layouts)
}

/// Open a FITS file and read its first binary table.
pub fn read_binary_table_file(path: &Path) -> Result<BinaryTable, FitsError> {
    let file = File::open(path)?;
    read_binary_table(BufReader::new(file))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// A column to be written: name, on-disk format, values.
pub struct ColumnSpec<'a> {
    pub name: &'a str,
    pub format: ColumnFormat,
    pub values: &'a [f64],
}

fn card(key: &str, value: &str) -> String {
    format!("{key:<8}= {value:>20}")
}

fn string_card(key: &str, value: &str) -> String {
    let quoted = format!("'{:<8}'", value.replace('\'', "''"));
    format!("{key:<8}= {quoted:<20}")
}

fn pad_to_block(buf: &mut Vec<u8>, fill: u8) {
    let len = buf.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    buf.resize(len, fill);
}

fn write_header<W: Write>(out: &mut W, cards: &[String]) -> io::Result<()> {
    let mut buf = Vec::with_capacity(BLOCK_SIZE);
    for c in cards.iter().map(String::as_str).chain(std::iter::once("END")) {
        buf.extend_from_slice(format!("{c:<80}").as_bytes());
    }
    pad_to_block(&mut buf, b' ');
    out.write_all(&buf)
}

/// Write an empty primary HDU followed by one BINTABLE extension.
pub fn write_binary_table<W: Write>(
    mut out: W,
    extname: Option<&str>,
    columns: &[ColumnSpec<'_>],
) -> Result<(), FitsError> {
    let num_rows = columns.first().map_or(0, |c| c.values.len());
    if let Some(bad) = columns.iter().find(|c| c.values.len() != num_rows) {
        return Err(FitsError::LengthMismatch {
            column: bad.name.to_string(),
            got: bad.values.len(),
            expected: num_rows,
        });
    }
    let row_len: usize = columns.iter().map(|c| c.format.width()).sum();

    write_header(
        &mut out,
        &[
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
            card("EXTEND", "T"),
        ],
    )?;

    let mut cards = vec![
        string_card("XTENSION", "BINTABLE"),
        card("BITPIX", "8"),
        card("NAXIS", "2"),
        card("NAXIS1", &row_len.to_string()),
        card("NAXIS2", &num_rows.to_string()),
        card("PCOUNT", "0"),
        card("GCOUNT", "1"),
        card("TFIELDS", &columns.len().to_string()),
    ];
    for (i, c) in columns.iter().enumerate() {
        let n = i + 1;
        cards.push(string_card(&format!("TTYPE{n}"), c.name));
        let tform = format!("1{}", c.format.code());
        cards.push(string_card(&format!("TFORM{n}"), &tform));
    }
    if let Some(name) = extname {
        cards.push(string_card("EXTNAME", name));
    }
    write_header(&mut out, &cards)?;

    let mut data = Vec::with_capacity(row_len * num_rows);
    for row in 0..num_rows {
        for c in columns {
            c.format.encode(&mut data, c.values[row])?;
        }
    }
    pad_to_block(&mut data, 0);
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}

pub fn write_binary_table_file(
    path: &Path,
    extname: Option<&str>,
    columns: &[ColumnSpec<'_>],
) -> Result<(), FitsError> {
    let file = File::create(path)?;
    write_binary_table(BufWriter::new(file), extname, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bytes() -> Vec<u8> {
        let mags = [24.5, 99.999, 18.25];
        let ids = [1.0, 2.0, 3.0];
        let chi = [1.2, 0.0, 3.4];
        let mut buf = Vec::new();
        write_binary_table(
            &mut buf,
            Some("PHOT"),
            &[
                ColumnSpec {
                    name: "ID",
                    format: ColumnFormat::I32,
                    values: &ids,
                },
                ColumnSpec {
                    name: "F475W_VEGA",
                    format: ColumnFormat::F32,
                    values: &mags,
                },
                ColumnSpec {
                    name: "F475W_CHI",
                    format: ColumnFormat::F64,
                    values: &chi,
                },
            ],
        )
        .unwrap();
        buf
    }

    #[test]
    fn written_file_is_block_aligned() {
        let buf = sample_bytes();
        assert_eq!(buf.len() % BLOCK_SIZE, 0);
        assert_eq!(buf.len(), 3 * BLOCK_SIZE);
    }

    #[test]
    fn reads_back_columns_in_order() {
        let table = read_binary_table(sample_bytes().as_slice()).unwrap();
        assert_eq!(table.extname.as_deref(), Some("PHOT"));
        assert_eq!(table.num_rows, 3);
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ID", "F475W_VEGA", "F475W_CHI"]);
        assert_eq!(table.columns[0].values, vec![1.0, 2.0, 3.0]);
        assert!((table.columns[1].values[1] - 99.999).abs() < 1e-4);
        assert_eq!(table.columns[2].values[2], 3.4);
    }

    #[test]
    fn parses_quoted_and_numeric_cards() {
        let quoted = format!("{:<80}", "TTYPE1  = 'O''NEIL  '           / name");
        let (k, v) = parse_card(&quoted).unwrap();
        assert_eq!((k.as_str(), v.as_str()), ("TTYPE1", "O'NEIL"));
        let numeric = format!("{:<80}", "NAXIS2  =                  42 / rows");
        let (k, v) = parse_card(&numeric).unwrap();
        assert_eq!((k.as_str(), v.as_str()), ("NAXIS2", "42"));
        assert!(parse_card(&format!("{:<80}", "COMMENT this is free text")).is_none());
    }

    #[test]
    fn tform_parsing() {
        assert_eq!(parse_tform("E"), Some((1, 'E')));
        assert_eq!(parse_tform("1D"), Some((1, 'D')));
        assert_eq!(parse_tform("20A"), Some((20, 'A')));
        assert_eq!(field_width(20, 'A'), Some(20));
        assert_eq!(field_width(9, 'X'), Some(2));
        assert_eq!(field_width(1, 'Z'), None);
    }

    #[test]
    fn missing_table_is_an_error() {
        let mut buf = Vec::new();
        write_header(&mut buf, &[card("SIMPLE", "T"), card("BITPIX", "8"), card("NAXIS", "0")])
            .unwrap();
        assert!(matches!(
            read_binary_table(buf.as_slice()),
            Err(FitsError::NoBinaryTable)
        ));
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let mut buf = Vec::new();
        let err = write_binary_table(
            &mut buf,
            None,
            &[
                ColumnSpec {
                    name: "A",
                    format: ColumnFormat::F32,
                    values: &[1.0, 2.0],
                },
                ColumnSpec {
                    name: "B",
                    format: ColumnFormat::F32,
                    values: &[1.0],
                },
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FitsError::LengthMismatch {
                got: 1,
                expected: 2,
                ..
            }
        ));
    }

    /// Primary HDU, then a one-column `1E` BINTABLE header built from
    /// `cards`, then one block of zeroed data.
    fn table_with_cards(cards: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_header(&mut buf, &[card("SIMPLE", "T"), card("BITPIX", "8"), card("NAXIS", "0")])
            .unwrap();
        let mut ext = vec![string_card("XTENSION", "BINTABLE")];
        ext.extend(cards.iter().map(|(k, v)| card(k, v)));
        ext.push(card("TFIELDS", "1"));
        ext.push(string_card("TTYPE1", "F475W_VEGA"));
        ext.push(string_card("TFORM1", "1E"));
        write_header(&mut buf, &ext).unwrap();
        buf.extend_from_slice(&[0u8; BLOCK_SIZE]);
        buf
    }

    fn rejected_keyword(cards: &[(&str, &str)]) -> String {
        match read_binary_table(table_with_cards(cards).as_slice()) {
            Err(FitsError::InvalidKeyword { key, .. }) => key,
            other => panic!("expected an invalid keyword, got {other:?}"),
        }
    }

    #[test]
    fn hand_built_header_reads() {
        let table = read_binary_table(
            table_with_cards(&[
                ("BITPIX", "8"),
                ("NAXIS", "2"),
                ("NAXIS1", "4"),
                ("NAXIS2", "2"),
            ])
            .as_slice(),
        )
        .unwrap();
        assert_eq!(table.num_rows, 2);
        assert_eq!(table.columns[0].values, vec![0.0, 0.0]);
    }

    #[test]
    fn non_byte_bitpix_is_rejected() {
        let key = rejected_keyword(&[
            ("BITPIX", "0"),
            ("NAXIS", "2"),
            ("NAXIS1", "4"),
            ("NAXIS2", "2"),
        ]);
        assert_eq!(key, "BITPIX");
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let key = rejected_keyword(&[
            ("BITPIX", "8"),
            ("NAXIS", "2"),
            ("NAXIS1", "4"),
            ("NAXIS2", "4611686018427387904"),
        ]);
        assert_eq!(key, "NAXIS2");
    }

    #[test]
    fn negative_pcount_is_rejected() {
        let key = rejected_keyword(&[
            ("BITPIX", "8"),
            ("NAXIS", "2"),
            ("NAXIS1", "4"),
            ("NAXIS2", "2"),
            ("PCOUNT", "-8"),
        ]);
        assert_eq!(key, "PCOUNT");
    }

    #[test]
    fn grouped_table_is_rejected() {
        let key = rejected_keyword(&[
            ("BITPIX", "8"),
            ("NAXIS", "2"),
            ("NAXIS1", "4"),
            ("NAXIS2", "2"),
            ("GCOUNT", "2"),
        ]);
        assert_eq!(key, "GCOUNT");
    }

    #[test]
    fn row_wider_than_naxis1_is_rejected() {
        let key = rejected_keyword(&[
            ("BITPIX", "8"),
            ("NAXIS", "2"),
            ("NAXIS1", "2"),
            ("NAXIS2", "2"),
        ]);
        assert_eq!(key, "NAXIS1");
    }

    #[test]
    fn short_data_unit_is_an_error() {
        // 4 TiB promised, one block present.
        let bytes = table_with_cards(&[
            ("BITPIX", "8"),
            ("NAXIS", "2"),
            ("NAXIS1", "4"),
            ("NAXIS2", "1099511627776"),
        ]);
        match read_binary_table(bytes.as_slice()) {
            Err(FitsError::Truncated { expected, got }) => {
                assert_eq!(expected, 4 << 40);
                assert_eq!(got, BLOCK_SIZE as u64);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_not_a_table() {
        let garbage = vec![b'x'; 2 * BLOCK_SIZE];
        assert!(matches!(
            read_binary_table(garbage.as_slice()),
            Err(FitsError::MissingEnd)
        ));
        assert!(matches!(
            read_binary_table(&b""[..]),
            Err(FitsError::NoBinaryTable)
        ));
    }
}
