//! Y. Hatanaka lossless TextDiff algorithm

/// [TextDiff] recovers text fields (epoch descriptors, observation flags,
/// clock picoseconds..) from their compressed form. Each compressed byte
/// either keeps the previous byte (' '), forces a whitespace ('&')
/// or overwrites the previous byte with itself.
/// Only decompression is supported.
#[derive(Debug, Default, Clone)]
pub struct TextDiff {
    buffer: Vec<u8>,
}

impl TextDiff {
    /// Creates a new [TextDiff] with given initial content
    pub fn new(data: &[u8]) -> Self {
        Self {
            buffer: data.to_vec(),
        }
    }

    /// Force kernel reset using new content
    pub fn force_init(&mut self, data: &[u8]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(data);
    }

    /// Clears the internal buffer: next decompression starts from scratch
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Decompresses given data. Returns recovered content.
    /// The recovered content is never shorter than previous content.
    pub fn decompress(&mut self, data: &[u8]) -> &[u8] {
        for (i, byte) in data.iter().enumerate() {
            let recovered = match byte {
                b'&' => b' ',
                b' ' => match self.buffer.get(i) {
                    Some(_) => continue,
                    None => b' ',
                },
                byte => *byte,
            };
            match self.buffer.get_mut(i) {
                Some(buf) => *buf = recovered,
                None => self.buffer.push(recovered),
            }
        }
        &self.buffer
    }

    /// Returns current content
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
