//! Support for RLE Lossless image decoding.
//!
//! implementation taken from Pydicom:
//! <https://github.com/pydicom/pydicom/blob/master/pydicom/pixel_data_handlers/rle_handler.py>
//!
//! Copyright 2008-2021 pydicom authors.
//!
//! License: <https://github.com/pydicom/pydicom/blob/master/LICENSE>
use byteordered::byteorder::{ByteOrder, LittleEndian};

use dicom_core::ops::AttributeOp;
use dicom_encoding::adapters::{
    decode_error, encode_error, DecodeResult, EncodeOptions, EncodeResult, PixelDataObject,
    PixelDataReader, PixelDataWriter,
};
use dicom_encoding::snafu::prelude::*;
use std::io::{self, Read, Seek};

/// Pixel data adapter for the RLE Lossless transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RleLosslessAdapter;

/// Pixel data decoder for RLE Lossless (UID `1.2.840.10008.1.2.5`)
impl PixelDataReader for RleLosslessAdapter {
    /// Decode the DICOM image from RLE Lossless completely.
    ///
    /// See <https://dicom.nema.org/medical/dicom/2023e/output/chtml/part05/chapter_G.html>
    fn decode(&self, src: &dyn PixelDataObject, dst: &mut Vec<u8>) -> DecodeResult<()> {
        let cols = src
            .cols()
            .context(decode_error::MissingAttributeSnafu { name: "Columns" })?;
        let rows = src
            .rows()
            .context(decode_error::MissingAttributeSnafu { name: "Rows" })?;
        let samples_per_pixel =
            src.samples_per_pixel()
                .context(decode_error::MissingAttributeSnafu {
                    name: "SamplesPerPixel",
                })?;
        let bits_allocated = src
            .bits_allocated()
            .context(decode_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            })?;

        if bits_allocated != 8 && bits_allocated != 16 {
            whatever!("BitsAllocated other than 8 or 16 is not supported");
        }
        // For RLE the number of fragments = number of frames
        // therefore, we can fetch the fragments one by one
        let nr_frames =
            src.number_of_fragments()
                .whatever_context("Invalid pixel data, no fragments found")? as usize;
        let bytes_per_sample = (bits_allocated / 8) as usize;
        let samples_per_pixel = samples_per_pixel as usize;
        // `stride` is the total number of bytes for each sample plane
        let stride = bytes_per_sample * cols as usize * rows as usize;
        let frame_size = stride * samples_per_pixel;
        // extend `dst` to make room for decoded pixel data
        let base_offset = dst.len();
        dst.resize(base_offset + frame_size * nr_frames, 0);

        // RLE encoded data is ordered like this (for 16-bit, 3 sample):
        //  Segment: 0     | 1     | 2     | 3     | 4     | 5
        //           R MSB | R LSB | G MSB | G LSB | B MSB | B LSB
        //  A segment contains only the MSB or LSB parts of all the sample pixels

        // As currently required,
        // we need to rearrange the pixel data to standard planar configuration.
        // (and use little endian byte ordering):
        //    Pixel 1                             | ... Pixel N
        //    Red         Green       Blue        | ...
        //    LSB R MSB R LSB G MSB G LSB B MSB B | ...

        for i in 0..nr_frames {
            let fragment = &src
                .fragment(i)
                .whatever_context("No pixel data found for frame")?;
            let mut offsets = read_rle_header(fragment);
            offsets.push(fragment.len() as u32);

            for sample_number in 0..samples_per_pixel {
                for byte_offset in (0..bytes_per_sample).rev() {
                    // ii is 1, 0, 3, 2, 5, 4 for the example above
                    // This is where the segment order correction occurs
                    let ii = sample_number * bytes_per_sample + byte_offset;
                    let segment = &fragment[offsets[ii] as usize..offsets[ii + 1] as usize];
                    let buff = io::Cursor::new(segment);
                    let (_, decoder) = PackBitsReader::new(buff, segment.len())
                        .whatever_context("Failed to read RLE segments")?;
                    let mut decoded_segment = Vec::with_capacity(rows as usize * cols as usize);
                    decoder
                        .take(rows as u64 * cols as u64)
                        .read_to_end(&mut decoded_segment)
                        .unwrap();

                    // Interleave pixels as described in the example above.
                    // in 16-bit, this is:
                    // MSB R channel: 1,  7, 13, ...
                    // LSB R channel: 0,  6, 12, ...
                    // MSB G channel: 3,  9, 15, ...
                    // LSB G channel: 2,  8, 14, ...
                    // MSB G channel: 5, 11, 17, ...
                    // LSB G channel: 4, 10, 16, ...
                    let frame_start = i * frame_size;
                    let start = frame_start +  if samples_per_pixel == 3 {
                        sample_number * bytes_per_sample + byte_offset
                    } else {
                        sample_number * bytes_per_sample + samples_per_pixel - byte_offset
                    };

                    let end = (i + 1) * frame_size;
                    for (decoded_index, dst_index) in (start..end)
                        .step_by(bytes_per_sample * samples_per_pixel)
                        .enumerate()
                    {
                        dst[base_offset + dst_index] = decoded_segment[decoded_index];
                    }
                }
            }
        }
        Ok(())
    }

    /// Decode a singe frame of the DICOM image from RLE Lossless.
    ///
    /// See <https://dicom.nema.org/medical/dicom/2023e/output/chtml/part05/chapter_G.html>
    fn decode_frame(
        &self,
        src: &dyn PixelDataObject,
        frame: u32,
        dst: &mut Vec<u8>,
    ) -> DecodeResult<()> {
        let cols = src
            .cols()
            .context(decode_error::MissingAttributeSnafu { name: "Columns" })?;
        let rows = src
            .rows()
            .context(decode_error::MissingAttributeSnafu { name: "Rows" })?;
        let samples_per_pixel =
            src.samples_per_pixel()
                .context(decode_error::MissingAttributeSnafu {
                    name: "SamplesPerPixel",
                })?;
        let bits_allocated = src
            .bits_allocated()
            .context(decode_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            })?;

        if bits_allocated != 8 && bits_allocated != 16 {
            whatever!("BitsAllocated other than 8 or 16 is not supported");
        }
        // For RLE the number of fragments = number of frames
        // therefore, we can fetch the fragments one by one
        let nr_frames =
            src.number_of_fragments()
                .whatever_context("Invalid pixel data, no fragments found")? as usize;
        ensure!(
            nr_frames > frame as usize,
            decode_error::FrameRangeOutOfBoundsSnafu
        );

        let bytes_per_sample = (bits_allocated / 8) as usize;
        let samples_per_pixel = samples_per_pixel as usize;
        // `stride` is the total number of bytes for each sample plane
        let stride = bytes_per_sample * cols as usize * rows as usize;
        let frame_size = stride * samples_per_pixel;
        // extend `dst` to make room for decoded pixel data
        let base_offset = dst.len();
        dst.resize(base_offset + frame_size, 0);

        // RLE encoded data is ordered like this (for 16-bit, 3 sample):
        //  Segment: 0     | 1     | 2     | 3     | 4     | 5
        //           R MSB | R LSB | G MSB | G LSB | B MSB | B LSB
        //  A segment contains only the MSB or LSB parts of all the sample pixels

        // As currently required,
        // we need to rearrange the pixel data to standard planar configuration.
        // (and use little endian byte ordering):
        //    Pixel 1                             | ... Pixel N
        //    Red         Green       Blue        | ...
        //    LSB R MSB R LSB G MSB G LSB B MSB B | ...

        let fragment = &src
            .fragment(frame as usize)
            .whatever_context("No pixel data found for frame")?;
        let mut offsets = read_rle_header(fragment);
        offsets.push(fragment.len() as u32);

        for sample_number in 0..samples_per_pixel {
            for byte_offset in (0..bytes_per_sample).rev() {
                // ii is 1, 0, 3, 2, 5, 4 for the example above
                // This is where the segment order correction occurs
                let ii = sample_number * bytes_per_sample + byte_offset;
                let segment = &fragment[offsets[ii] as usize..offsets[ii + 1] as usize];
                let buff = io::Cursor::new(segment);
                let (_, decoder) = PackBitsReader::new(buff, segment.len())
                    .map_err(|e| Box::new(e) as Box<_>)
                    .whatever_context("Failed to read RLE segments")?;
                let mut decoded_segment = Vec::with_capacity(rows as usize * cols as usize);
                decoder
                    .take(rows as u64 * cols as u64)
                    .read_to_end(&mut decoded_segment)
                    .unwrap();

                // Interleave pixels as described in the example above.
                let start = if samples_per_pixel == 3 {
                    sample_number * bytes_per_sample + byte_offset
                } else {
                    sample_number * bytes_per_sample + samples_per_pixel - byte_offset
                };

                let end = frame_size;
                for (decoded_index, dst_index) in (start..end)
                    .step_by(bytes_per_sample * samples_per_pixel)
                    .enumerate()
                {
                    dst[base_offset + dst_index] = decoded_segment[decoded_index];
                }
            }
        }
        Ok(())
    }
}

/// Pixel data encoder for RLE Lossless (UID `1.2.840.10008.1.2.5`)
impl PixelDataWriter for RleLosslessAdapter {
    /// Encode a single frame of the DICOM image into RLE Lossless.
    ///
    /// See <https://dicom.nema.org/medical/dicom/2023e/output/chtml/part05/chapter_G.html>
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
        let samples_per_pixel = samples_per_pixel as usize;
        let nr_segments = bytes_per_sample * samples_per_pixel;
        ensure_whatever!(
            nr_segments <= 15,
            "Too many RLE segments required ({}), 15 is the maximum",
            nr_segments
        );

        let stride = bytes_per_sample * cols as usize * rows as usize;
        let frame_size = stride * samples_per_pixel;

        let frame_uncompressed = src
            .fragment(frame as usize)
            .context(encode_error::FrameRangeOutOfBoundsSnafu)?;

        // split the interleaved frame into per-sample, per-byte-plane segments,
        // the inverse of the rearrangement done in `decode_frame`
        let mut segments: Vec<Vec<u8>> = Vec::with_capacity(nr_segments);
        for _ in 0..nr_segments {
            segments.push(Vec::with_capacity(rows as usize * cols as usize));
        }
        for sample_number in 0..samples_per_pixel {
            for byte_offset in 0..bytes_per_sample {
                let ii = sample_number * bytes_per_sample + byte_offset;
                let start = if samples_per_pixel == 3 {
                    sample_number * bytes_per_sample + byte_offset
                } else {
                    sample_number * bytes_per_sample + samples_per_pixel - byte_offset
                };
                for idx in (start..frame_size).step_by(bytes_per_sample * samples_per_pixel) {
                    segments[ii].push(frame_uncompressed[idx]);
                }
            }
        }

        let packed: Vec<Vec<u8>> = segments.iter().map(|s| pack_bits_encode(s)).collect();

        // RLE header: segment count followed by 15 offsets, all little endian u32
        let header_len = 64;
        let len_before = dst.len();
        dst.resize(len_before + header_len, 0);
        LittleEndian::write_u32(&mut dst[len_before..len_before + 4], nr_segments as u32);

        let mut offset = header_len as u32;
        for (i, segment) in packed.iter().enumerate() {
            LittleEndian::write_u32(
                &mut dst[len_before + 4 + i * 4..len_before + 8 + i * 4],
                offset,
            );
            dst.extend_from_slice(segment);
            offset += segment.len() as u32;
        }

        if dst.len() % 2 != 0 {
            dst.push(0);
        }

        Ok(vec![])
    }
}

/// Greedy PackBits encoder, producing output readable by [`PackBitsReader`].
fn pack_bits_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let len = data.len();
    let mut i = 0;
    while i < len {
        let mut run_len = 1;
        while i + run_len < len && run_len < 128 && data[i + run_len] == data[i] {
            run_len += 1;
        }
        if run_len >= 3 {
            out.push((1i32 - run_len as i32) as i8 as u8);
            out.push(data[i]);
            i += run_len;
        } else {
            let lit_start = i;
            let mut lit_len = 1;
            i += 1;
            while i < len && lit_len < 128 {
                let mut j = i;
                while j < len && j - i < 3 && data[j] == data[i] {
                    j += 1;
                }
                if j - i >= 3 {
                    break;
                }
                lit_len += 1;
                i += 1;
            }
            out.push((lit_len - 1) as u8);
            out.extend_from_slice(&data[lit_start..lit_start + lit_len]);
        }
    }
    out
}

// Read the RLE header and return the offsets
fn read_rle_header(fragment: &[u8]) -> Vec<u32> {
    let nr_segments = LittleEndian::read_u32(&fragment[0..4]);
    let mut offsets = vec![0; nr_segments as usize];
    LittleEndian::read_u32_into(&fragment[4..4 * (nr_segments + 1) as usize], &mut offsets);
    offsets
}

/// PackBits Reader from the image-tiff crate
/// Copyright 2018-2021 PistonDevelopers.
/// License: <https://github.com/image-rs/image-tiff/blob/master/LICENSE>
/// From: https://github.com/image-rs/image-tiff/blob/master/src/decoder/stream.rs
#[derive(Debug)]
struct PackBitsReader {
    buffer: io::Cursor<Vec<u8>>,
}

impl PackBitsReader {
    /// Wraps a reader
    pub fn new<R: Read + Seek>(
        mut reader: R,
        length: usize,
    ) -> io::Result<(usize, PackBitsReader)> {
        let mut buffer = Vec::new();
        let mut header: [u8; 1] = [0];
        let mut data: [u8; 1] = [0];

        let mut bytes_read = 0;
        while bytes_read < length {
            reader.read_exact(&mut header)?;
            bytes_read += 1;

            let h = header[0] as i8;
            if (-127..=-1).contains(&h) {
                let new_len = buffer.len() + (1 - h as isize) as usize;
                reader.read_exact(&mut data)?;
                buffer.resize(new_len, data[0]);
                bytes_read += 1;
            } else if h >= 0 {
                let num_vals = h as usize + 1;
                io::copy(&mut reader.by_ref().take(num_vals as u64), &mut buffer)?;
                bytes_read += num_vals;
            } else {
                // h = -128 is a no-op.
            }
        }

        Ok((
            buffer.len(),
            PackBitsReader {
                buffer: io::Cursor::new(buffer),
            },
        ))
    }
}

impl Read for PackBitsReader {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packbits() {
        let encoded = vec![
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let encoded_len = encoded.len();

        let buff = io::Cursor::new(encoded);
        let (_, mut decoder) = PackBitsReader::new(buff, encoded_len).unwrap();

        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();

        let expected = vec![
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn packbits_roundtrip() {
        let original = vec![
            0xAAu8, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 1, 2, 3, 4, 5, 0xFF, 0xFF,
        ];
        let packed = pack_bits_encode(&original);
        let buff = io::Cursor::new(packed.clone());
        let (_, mut decoder) = PackBitsReader::new(buff, packed.len()).unwrap();
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, original);
    }

    /// a minimal in-memory pixel data object for round trip testing
    struct TestFrame {
        rows: u16,
        cols: u16,
        samples_per_pixel: u16,
        bits_allocated: u16,
        data: Vec<u8>,
    }

    impl PixelDataObject for TestFrame {
        fn transfer_syntax_uid(&self) -> &str {
            "1.2.840.10008.1.2.5"
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
    fn rle_8bit_rgb_roundtrip() {
        let rows = 2;
        let cols = 2;
        let samples_per_pixel = 3;
        // 4 pixels, RGB interleaved
        let pixels: Vec<u8> = vec![
            10, 20, 30, // pixel 0
            10, 20, 30, // pixel 1
            200, 100, 50, // pixel 2
            10, 20, 30, // pixel 3
        ];

        let src = TestFrame {
            rows,
            cols,
            samples_per_pixel,
            bits_allocated: 8,
            data: pixels.clone(),
        };

        let adapter = RleLosslessAdapter;
        let mut encoded = Vec::new();
        adapter
            .encode_frame(&src, 0, EncodeOptions::new(), &mut encoded)
            .unwrap();
        assert_eq!(encoded.len() % 2, 0);

        let encoded_src = TestFrame {
            rows,
            cols,
            samples_per_pixel,
            bits_allocated: 8,
            data: encoded,
        };

        let mut decoded = Vec::new();
        adapter.decode_frame(&encoded_src, 0, &mut decoded).unwrap();
        assert_eq!(decoded, pixels);
    }
}
