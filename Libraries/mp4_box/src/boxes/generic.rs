// The `Mp4Box` trait defines a generic interface for MP4 boxes.
// Each box has a 4 byte type and a payload; implementors only describe the payload and get
// the header handling for free.
//
// Required Methods:
// - `box_type`: Returns the 4-byte type identifier of the box.
// - `write_content`: Serializes the payload (everything after the 8 byte header).
//
// Reading is done by each box's own `read` function, since some boxes need extra context
// (the `trun` layout depends on the track type).
pub trait Mp4Box {
    // Returns the 4-byte type identifier of the box.
    fn box_type(&self) -> [u8; 4];

    // Serializes the box payload into the provided buffer.
    fn write_content(&self, buffer: &mut Vec<u8>);

    // Calculates the total size of the box in bytes, header included.
    fn box_size(&self) -> u32 {
        let mut content = Vec::new();
        self.write_content(&mut content);
        8 + content.len() as u32
    }

    // Serializes the whole box (size, type, payload) into the provided buffer.
    fn write_box(&self, buffer: &mut Vec<u8>) {
        write_atom(buffer, &self.box_type(), |buffer| self.write_content(buffer));
    }
}

/// Writes a box header, lets `content` fill in the payload, then patches the size.
/// Used directly for container boxes (`moov`, `trak`, `moof`, ...) that only hold other boxes.
pub fn write_atom(buffer: &mut Vec<u8>, name: &[u8; 4], content: impl FnOnce(&mut Vec<u8>)) {
    let start = buffer.len();
    buffer.extend_from_slice(&0u32.to_be_bytes());
    buffer.extend_from_slice(name);
    content(buffer);
    let size = (buffer.len() - start) as u32;
    buffer[start..start + 4].copy_from_slice(&size.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RawBox(Vec<u8>);

    impl Mp4Box for RawBox {
        fn box_type(&self) -> [u8; 4] { *b"free" }

        fn write_content(&self, buffer: &mut Vec<u8>) {
            buffer.extend_from_slice(&self.0);
        }
    }

    #[test]
    fn write_box_patches_size() {
        let raw = RawBox(vec![1, 2, 3]);
        let mut buffer = vec![0xFF];
        raw.write_box(&mut buffer);

        assert_eq!(raw.box_size(), 11);
        assert_eq!(&buffer[1..5], &11u32.to_be_bytes());
        assert_eq!(&buffer[5..9], b"free");
        assert_eq!(&buffer[9..], &[1, 2, 3]);
    }

    #[test]
    fn nested_atoms_sizes_include_children() {
        let mut buffer = Vec::new();
        write_atom(&mut buffer, b"moov", |buffer| {
            write_atom(buffer, b"trak", |buffer| buffer.extend_from_slice(&[0; 4]));
        });
        assert_eq!(&buffer[0..4], &24u32.to_be_bytes());
        assert_eq!(&buffer[8..12], &12u32.to_be_bytes());
    }
}
