//! Support for JPEG Lossless, Non-Hierarchical, First-Order Prediction
//! (Process 14, Selection Value 1) image decoding and encoding.
//!
//! This is a from-scratch DPCM + Huffman codec, following the marker
//! and entropy-coding layout of ITU-T T.81 Annex H: `SOI`, optional
//! `DHT` segments, `SOF3`, `SOS`, entropy-coded data, `EOI`.

use dicom_core::ops::AttributeOp;
use dicom_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, PixelDataObject,
    PixelDataReader, PixelDataWriter,
};
use dicom_encoding::snafu::prelude::*;

const SOI: u16 = 0xFFD8;
const EOI: u16 = 0xFFD9;
const DHT: u16 = 0xFFC4;
const SOF3: u16 = 0xFFC3;
const SOS: u16 = 0xFFDA;

/// Pixel data adapter for JPEG Lossless, Non-Hierarchical, First-Order
/// Prediction (UID `1.2.840.10008.1.2.4.70`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JpegLosslessAdapter;

impl PixelDataReader for JpegLosslessAdapter {
    fn decode_frame(
        &self,
        src: &dyn PixelDataObject,
        frame: u32,
        dst: &mut Vec<u8>,
    ) -> DecodeResult<()> {
        let fragment = src
            .fragment(frame as usize)
            .context(decode_error::FrameRangeOutOfBoundsSnafu)?;

        let stream = JpegStream::parse(&fragment)
            .whatever_context("Failed to parse JPEG Lossless bitstream")?;

        let bytes_per_sample = if stream.precision > 8 { 2 } else { 1 };
        let frame_size =
            stream.width as usize * stream.height as usize * stream.components * bytes_per_sample;
        let base_offset = dst.len();
        dst.resize(base_offset + frame_size, 0);

        let samples = stream
            .decode()
            .whatever_context("Failed to decode JPEG Lossless entropy-coded data")?;

        for (i, sample) in samples.into_iter().enumerate() {
            if bytes_per_sample == 2 {
                let o = base_offset + i * 2;
                dst[o] = (sample & 0xFF) as u8;
                dst[o + 1] = (sample >> 8) as u8;
            } else {
                dst[base_offset + i] = sample as u8;
            }
        }

        Ok(())
    }
}

impl PixelDataWriter for JpegLosslessAdapter {
    fn encode_frame(
        &self,
        src: &dyn PixelDataObject,
        frame: u32,
        _options: EncodeOptions,
        dst: &mut Vec<u8>,
    ) -> EncodeResult<Vec<AttributeOp>> {
        let cols = src
            .cols()
            .context(encode_error::MissingAttributeSnafu { name: "Columns" })?;
        let rows = src
            .rows()
            .context(encode_error::MissingAttributeSnafu { name: "Rows" })?;
        let samples_per_pixel =
            src.samples_per_pixel()
                .context(encode_error::MissingAttributeSnafu {
                    name: "SamplesPerPixel",
                })?;
        let bits_allocated = src
            .bits_allocated()
            .context(encode_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            })?;

        if bits_allocated != 8 && bits_allocated != 16 {
            whatever!("BitsAllocated other than 8 or 16 is not supported");
        }

        let bytes_per_sample = (bits_allocated / 8) as usize;
        let components = samples_per_pixel as usize;

        let frame_uncompressed = src
            .fragment(frame as usize)
            .context(encode_error::FrameRangeOutOfBoundsSnafu)?;

        let num_samples = rows as usize * cols as usize * components;
        ensure_whatever!(
            frame_uncompressed.len() >= num_samples * bytes_per_sample,
            "Not enough pixel data for the declared frame size"
        );

        let mut samples = Vec::with_capacity(num_samples);
        for i in 0..num_samples {
            let v = if bytes_per_sample == 2 {
                let o = i * 2;
                u16::from(frame_uncompressed[o]) | (u16::from(frame_uncompressed[o + 1]) << 8)
            } else {
                u16::from(frame_uncompressed[i])
            };
            samples.push(v);
        }

        let stream = JpegStream {
            precision: bits_allocated,
            width: cols,
            height: rows,
            components,
        };

        stream
            .encode(&samples, dst)
            .whatever_context("Failed to encode JPEG Lossless bitstream")?;

        if dst.len() % 2 != 0 {
            dst.push(0);
        }

        Ok(vec![])
    }
}

/// Parsed structural information of a JPEG Lossless bitstream, plus
/// enough of the raw data to decode its single scan.
struct JpegStream<'a> {
    precision: u16,
    width: u16,
    height: u16,
    components: usize,
    entropy: &'a [u8],
    huffman: HuffmanDecodeTable,
    predictor_selection: u8,
    point_transform: u8,
}

impl<'a> JpegStream<'a> {
    fn parse(data: &'a [u8]) -> Result<Self, String> {
        let mut pos = 0;
        let marker = read_marker(data, &mut pos)?;
        if marker != SOI {
            return Err("Missing SOI marker".to_string());
        }

        let mut huffman = None;
        let mut precision = 0u16;
        let mut width = 0u16;
        let mut height = 0u16;
        let mut components = 0usize;
        let mut predictor_selection = 1u8;
        let mut point_transform = 0u8;

        loop {
            let marker = read_marker(data, &mut pos)?;
            match marker {
                DHT => {
                    let seg = read_segment(data, &mut pos)?;
                    huffman = Some(HuffmanDecodeTable::parse(seg)?);
                }
                SOF3 => {
                    let seg = read_segment(data, &mut pos)?;
                    if seg.len() < 6 {
                        return Err("Truncated SOF3 segment".to_string());
                    }
                    precision = seg[0] as u16;
                    height = u16::from_be_bytes([seg[1], seg[2]]);
                    width = u16::from_be_bytes([seg[3], seg[4]]);
                    components = seg[5] as usize;
                }
                SOS => {
                    let seg = read_segment(data, &mut pos)?;
                    if seg.is_empty() {
                        return Err("Truncated SOS segment".to_string());
                    }
                    let nc = seg[0] as usize;
                    let base = 1 + nc * 2;
                    if seg.len() < base + 3 {
                        return Err("Truncated SOS segment".to_string());
                    }
                    predictor_selection = seg[base];
                    point_transform = seg[base + 2] & 0x0F;
                    // entropy-coded data begins right after the SOS segment
                    let entropy = &data[pos..];
                    let huffman = huffman.ok_or_else(|| "Missing DHT before SOS".to_string())?;
                    return Ok(JpegStream {
                        precision,
                        width,
                        height,
                        components,
                        entropy,
                        huffman,
                        predictor_selection,
                        point_transform,
                    });
                }
                EOI => return Err("Reached EOI before SOS".to_string()),
                _ => {
                    // skip unrecognized/unsupported segments (e.g. APPn, COM)
                    read_segment(data, &mut pos)?;
                }
            }
        }
    }

    fn decode(&self) -> Result<Vec<u16>, String> {
        let width = self.width as usize;
        let height = self.height as usize;
        let components = self.components.max(1);
        let pt = self.point_transform;

        let mut reader = BitReader::new(self.entropy);
        let mut out = vec![0u16; width * height * components];
        let seed = 1u32 << (self.precision as u32 - pt as u32 - 1);

        let mut prev_row = vec![seed as u16; width * components];

        for row in 0..height {
            let mut left = vec![seed as u16; components];
            for col in 0..width {
                for c in 0..components {
                    let ra = if col == 0 { None } else { Some(left[c]) };
                    let rb = if row == 0 { None } else { Some(prev_row[col * components + c]) };
                    let rc = if row == 0 || col == 0 {
                        None
                    } else {
                        Some(prev_row[(col - 1) * components + c])
                    };

                    let predicted = predict(self.predictor_selection, seed as u16, ra, rb, rc);
                    let category = self
                        .huffman
                        .decode_symbol(&mut reader)
                        .ok_or_else(|| "Huffman decode failure".to_string())?;
                    let diff = if category == 0 {
                        0i32
                    } else {
                        let bits = reader
                            .read_bits(category as u32)
                            .ok_or_else(|| "Truncated entropy data".to_string())?;
                        extend(bits, category)
                    };

                    let value =
                        ((predicted as i32 + diff).rem_euclid(1i32 << self.precision)) as u16;
                    out[row * width * components + col * components + c] = value;
                    left[c] = value;
                    prev_row[col * components + c] = value;
                }
            }
        }

        Ok(out)
    }

    fn encode(&self, samples: &[u16], dst: &mut Vec<u8>) -> Result<(), String> {
        let width = self.width as usize;
        let height = self.height as usize;
        let components = self.components.max(1);
        let pt = self.point_transform;
        let seed = (1u32 << (self.precision as u32 - pt as u32 - 1)) as u16;

        // first pass: compute categories and residuals
        let mut categories = Vec::with_capacity(samples.len());
        let mut residual_bits = Vec::with_capacity(samples.len());
        let mut prev_row = vec![seed; width * components];
        for row in 0..height {
            let mut left = vec![seed; components];
            for col in 0..width {
                for c in 0..components {
                    let idx = row * width * components + col * components + c;
                    let value = samples[idx];
                    let ra = if col == 0 { None } else { Some(left[c]) };
                    let rb = if row == 0 { None } else { Some(prev_row[col * components + c]) };
                    let rc = if row == 0 || col == 0 {
                        None
                    } else {
                        Some(prev_row[(col - 1) * components + c])
                    };
                    let predicted = predict(self.predictor_selection, seed, ra, rb, rc);
                    let diff = wrap_signed(value as i32 - predicted as i32, self.precision);
                    let category = category_of(diff);
                    categories.push(category);
                    residual_bits.push(reduce(diff, category));

                    left[c] = value;
                    prev_row[col * components + c] = value;
                }
            }
        }

        let mut freqs = [0u32; 17];
        for &cat in &categories {
            freqs[cat as usize] += 1;
        }
        let table = HuffmanEncodeTable::build(&freqs);

        write_marker(dst, SOI);
        write_marker(dst, DHT);
        let dht_body = table.to_dht_body();
        write_u16(dst, dht_body.len() as u16 + 2);
        dst.extend_from_slice(&dht_body);

        write_marker(dst, SOF3);
        write_u16(dst, 8 + 3 * components as u16);
        dst.push(self.precision as u8);
        write_u16(dst, self.height);
        write_u16(dst, self.width);
        dst.push(components as u8);
        for i in 0..components {
            dst.push((i + 1) as u8);
            dst.push(0x11);
            dst.push(0);
        }

        write_marker(dst, SOS);
        write_u16(dst, 6 + 2 * components as u16);
        dst.push(components as u8);
        for i in 0..components {
            dst.push((i + 1) as u8);
            dst.push(0x00);
        }
        dst.push(self.predictor_selection);
        dst.push(0);
        dst.push(pt);

        let mut writer = BitWriter::new();
        for (cat, bits) in categories.iter().zip(residual_bits.iter()) {
            let (code, len) = table
                .code_for(*cat)
                .ok_or_else(|| "No Huffman code for category".to_string())?;
            writer.write_bits(code, len);
            if *cat > 0 {
                writer.write_bits(*bits, *cat);
            }
        }
        dst.extend_from_slice(&writer.finish());

        write_marker(dst, EOI);
        Ok(())
    }
}

fn predict(selection_value: u8, seed: u16, ra: Option<u16>, rb: Option<u16>, rc: Option<u16>) -> u16 {
    match (ra, rb) {
        (None, None) => seed,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(a), Some(b)) => {
            let c = rc.unwrap_or(seed);
            let (a, b, c) = (a as i32, b as i32, c as i32);
            let p = match selection_value {
                1 => a,
                2 => b,
                3 => c,
                4 => a + b - c,
                5 => a + ((b - c) / 2),
                6 => b + ((a - c) / 2),
                7 => (a + b) / 2,
                _ => a,
            };
            p as u16
        }
    }
}

fn wrap_signed(diff: i32, precision: u16) -> i32 {
    let range = 1i32 << precision;
    let half = range / 2;
    let mut d = diff % range;
    if d > half {
        d -= range;
    } else if d < -half {
        d += range;
    }
    d
}

fn category_of(diff: i32) -> u8 {
    if diff == 0 {
        0
    } else {
        32 - (diff.unsigned_abs()).leading_zeros() as u8
    }
}

fn reduce(diff: i32, category: u8) -> u16 {
    if category == 0 {
        0
    } else if diff >= 0 {
        diff as u16
    } else {
        (diff + (1 << category) - 1) as u16
    }
}

fn extend(bits: u16, category: u8) -> i32 {
    let half = 1i32 << (category as i32 - 1);
    let v = bits as i32;
    if v < half {
        v - (1 << category) + 1
    } else {
        v
    }
}

fn read_marker(data: &[u8], pos: &mut usize) -> Result<u16, String> {
    while *pos + 1 < data.len() && data[*pos] != 0xFF {
        *pos += 1;
    }
    if *pos + 1 >= data.len() {
        return Err("Truncated marker".to_string());
    }
    let marker = u16::from_be_bytes([data[*pos], data[*pos + 1]]);
    *pos += 2;
    Ok(marker)
}

fn read_segment<'a>(data: &'a [u8], pos: &mut usize) -> Result<&'a [u8], String> {
    if *pos + 2 > data.len() {
        return Err("Truncated segment length".to_string());
    }
    let len = u16::from_be_bytes([data[*pos], data[*pos + 1]]) as usize;
    if len < 2 || *pos + len > data.len() {
        return Err("Truncated segment body".to_string());
    }
    let body = &data[*pos + 2..*pos + len];
    *pos += len;
    Ok(body)
}

fn write_marker(dst: &mut Vec<u8>, marker: u16) {
    dst.extend_from_slice(&marker.to_be_bytes());
}

fn write_u16(dst: &mut Vec<u8>, v: u16) {
    dst.extend_from_slice(&v.to_be_bytes());
}

/// A bit-level reader over a JPEG entropy-coded segment, transparently
/// undoing `0xFF 0x00` byte stuffing.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        if self.pos >= self.data.len() {
            return None;
        }
        let b = self.data[self.pos];
        self.pos += 1;
        if b == 0xFF {
            if self.pos < self.data.len() && self.data[self.pos] == 0x00 {
                self.pos += 1;
            }
        }
        Some(b)
    }

    fn read_bit(&mut self) -> Option<u32> {
        if self.bit_count == 0 {
            let byte = self.next_byte()?;
            self.bit_buf = byte as u32;
            self.bit_count = 8;
        }
        self.bit_count -= 1;
        Some((self.bit_buf >> self.bit_count) & 1)
    }

    fn read_bits(&mut self, n: u32) -> Option<u16> {
        let mut v = 0u32;
        for _ in 0..n {
            v = (v << 1) | self.read_bit()?;
        }
        Some(v as u16)
    }
}

/// A bit-level writer that byte-stuffs `0xFF` bytes in its output.
struct BitWriter {
    out: Vec<u8>,
    bit_buf: u32,
    bit_count: u32,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter {
            out: Vec::new(),
            bit_buf: 0,
            bit_count: 0,
        }
    }

    fn write_bits(&mut self, value: u16, len: u8) {
        for i in (0..len).rev() {
            let bit = (value >> i) & 1;
            self.bit_buf = (self.bit_buf << 1) | bit as u32;
            self.bit_count += 1;
            if self.bit_count == 8 {
                self.flush_byte();
            }
        }
    }

    fn flush_byte(&mut self) {
        let byte = (self.bit_buf & 0xFF) as u8;
        self.out.push(byte);
        if byte == 0xFF {
            self.out.push(0x00);
        }
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.bit_buf = (self.bit_buf << pad) | ((1 << pad) - 1);
            self.bit_count = 8;
            self.flush_byte();
        }
        self.out
    }
}

/// Huffman table built from code-length counts and a value list, as
/// found in a `DHT` segment (ITU-T T.81 Annex C).
struct HuffmanDecodeTable {
    // (length, code) -> symbol
    codes: Vec<(u8, u16, u8)>,
}

impl HuffmanDecodeTable {
    fn parse(seg: &[u8]) -> Result<Self, String> {
        if seg.len() < 17 {
            return Err("Truncated DHT table".to_string());
        }
        // seg[0] is table class/id, ignored: a single shared table is used
        let counts = &seg[1..17];
        let mut values = seg[17..].iter();
        let mut codes = Vec::new();
        let mut code = 0u16;
        for (i, &count) in counts.iter().enumerate() {
            let length = (i + 1) as u8;
            for _ in 0..count {
                let symbol = *values
                    .next()
                    .ok_or_else(|| "Truncated DHT value list".to_string())?;
                codes.push((length, code, symbol));
                code += 1;
            }
            code <<= 1;
        }
        Ok(HuffmanDecodeTable { codes })
    }

    fn decode_symbol(&self, reader: &mut BitReader) -> Option<u8> {
        let mut code = 0u16;
        for length in 1..=16u8 {
            code = (code << 1) | reader.read_bit()? as u16;
            for &(l, c, symbol) in &self.codes {
                if l == length && c == code {
                    return Some(symbol);
                }
            }
        }
        None
    }
}

/// Canonical Huffman table builder for encoding: maps each SSSS
/// category (0..=16) to a bit length, via a standard Huffman tree over
/// the observed category frequencies.
struct HuffmanEncodeTable {
    lengths: [u8; 17],
    codes: [u16; 17],
}

impl HuffmanEncodeTable {
    fn build(freqs: &[u32; 17]) -> Self {
        #[derive(Clone)]
        enum Node {
            Leaf(u8),
            Internal(Box<Node>, Box<Node>),
        }

        let mut entries: Vec<(u32, Node)> = freqs
            .iter()
            .enumerate()
            .filter(|(_, &f)| f > 0)
            .map(|(sym, &f)| (f, Node::Leaf(sym as u8)))
            .collect();

        if entries.is_empty() {
            entries.push((1, Node::Leaf(0)));
        }
        if entries.len() == 1 {
            // guarantee at least one split so the single symbol gets a
            // real (non-empty) code
            entries.push((0, Node::Leaf(16)));
        }

        while entries.len() > 1 {
            entries.sort_by_key(|(f, _)| *f);
            let (f0, n0) = entries.remove(0);
            let (f1, n1) = entries.remove(0);
            entries.push((f0 + f1, Node::Internal(Box::new(n0), Box::new(n1))));
        }

        let mut lengths = [0u8; 17];
        fn walk(node: &Node, depth: u8, lengths: &mut [u8; 17]) {
            match node {
                Node::Leaf(sym) => lengths[*sym as usize] = depth.max(1),
                Node::Internal(l, r) => {
                    walk(l, depth + 1, lengths);
                    walk(r, depth + 1, lengths);
                }
            }
        }
        walk(&entries[0].1, 0, &mut lengths);

        let mut by_length: Vec<(u8, u8)> = lengths
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > 0)
            .map(|(sym, &l)| (l, sym as u8))
            .collect();
        by_length.sort();

        let mut codes = [0u16; 17];
        let mut code = 0u16;
        let mut prev_len = 0u8;
        for (len, sym) in &by_length {
            code <<= len - prev_len;
            codes[*sym as usize] = code;
            code += 1;
            prev_len = *len;
        }

        HuffmanEncodeTable { lengths, codes }
    }

    fn code_for(&self, symbol: u8) -> Option<(u16, u8)> {
        let len = self.lengths[symbol as usize];
        if len == 0 {
            None
        } else {
            Some((self.codes[symbol as usize], len))
        }
    }

    fn to_dht_body(&self) -> Vec<u8> {
        let mut counts = [0u8; 16];
        let mut values_by_length: Vec<Vec<u8>> = vec![Vec::new(); 17];
        for sym in 0..=16u8 {
            let len = self.lengths[sym as usize];
            if len > 0 {
                counts[len as usize - 1] += 1;
                values_by_length[len as usize].push(sym);
            }
        }
        for v in values_by_length.iter_mut() {
            v.sort_by_key(|&sym| self.codes[sym as usize]);
        }

        let mut out = Vec::new();
        out.push(0u8); // table class 0 (DC/lossless), id 0
        out.extend_from_slice(&counts);
        for len in 1..=16usize {
            out.extend_from_slice(&values_by_length[len]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packbits_style_huffman_roundtrip() {
        let freqs = {
            let mut f = [0u32; 17];
            f[0] = 10;
            f[1] = 20;
            f[2] = 5;
            f[8] = 1;
            f
        };
        let table = HuffmanEncodeTable::build(&freqs);
        let dht_body = table.to_dht_body();
        let decode_table = HuffmanDecodeTable::parse(&dht_body).unwrap();

        let mut writer = BitWriter::new();
        let symbols = [0u8, 1, 2, 8, 1, 0];
        for &sym in &symbols {
            let (code, len) = table.code_for(sym).unwrap();
            writer.write_bits(code, len);
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for &expected in &symbols {
            let got = decode_table.decode_symbol(&mut reader).unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn category_and_extend_roundtrip() {
        for diff in [-300i32, -1, 0, 1, 255, 1000] {
            let cat = category_of(diff);
            let bits = reduce(diff, cat);
            let back = if cat == 0 { 0 } else { extend(bits, cat) };
            assert_eq!(back, diff);
        }
    }

    struct TestFrame {
        rows: u16,
        cols: u16,
        samples_per_pixel: u16,
        bits_allocated: u16,
        data: Vec<u8>,
    }

    impl PixelDataObject for TestFrame {
        fn transfer_syntax_uid(&self) -> &str {
            "1.2.840.10008.1.2.4.70"
        }
        fn rows(&self) -> Option<u16> {
            Some(self.rows)
        }
        fn cols(&self) -> Option<u16> {
            Some(self.cols)
        }
        fn samples_per_pixel(&self) -> Option<u16> {
            Some(self.samples_per_pixel)
        }
        fn bits_allocated(&self) -> Option<u16> {
            Some(self.bits_allocated)
        }
        fn bits_stored(&self) -> Option<u16> {
            Some(self.bits_allocated)
        }
        fn number_of_frames(&self) -> Option<u32> {
            Some(1)
        }
        fn number_of_fragments(&self) -> Option<u32> {
            Some(1)
        }
        fn fragment(&self, fragment: usize) -> Option<std::borrow::Cow<[u8]>> {
            if fragment == 0 {
                Some(std::borrow::Cow::Borrowed(&self.data))
            } else {
                None
            }
        }
        fn offset_table(&self) -> Option<std::borrow::Cow<[u32]>> {
            None
        }
        fn raw_pixel_data(&self) -> Option<dicom_encoding::adapters::RawPixelData> {
            None
        }
    }

    #[test]
    fn grayscale_8bit_roundtrip() {
        let rows = 2;
        let cols = 2;
        let pixels: Vec<u8> = vec![10, 12, 200, 12];

        let src = TestFrame {
            rows,
            cols,
            samples_per_pixel: 1,
            bits_allocated: 8,
            data: pixels.clone(),
        };

        let adapter = JpegLosslessAdapter;
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&src, 0, EncodeOptions::new(), &mut encoded)
            .unwrap();

        let encoded_src = TestFrame {
            rows,
            cols,
            samples_per_pixel: 1,
            bits_allocated: 8,
            data: encoded,
        };

        let mut decoded = Vec::new();
        adapter
            .decode_frame(&encoded_src, 0, &mut decoded)
            .unwrap();
        assert_eq!(decoded, pixels);
    }
}
