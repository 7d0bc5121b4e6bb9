use crate::{format_capped_bytes, format_fourcc};

/// Size of the box header: 4 byte big-endian size + 4 byte type.
pub const ATOM_HEADER_SIZE: usize = 8;

// An `Atom` is one box found in a buffer. It borrows its payload from the buffer it was
// parsed from, so walking the tree never copies media data.
//
// Fields:
// - `size`: the size declared in the header, header included (always >= 8).
// - `name`: the 4 byte box type, e.g. `moov`.
// - `content`: the payload, `size - 8` bytes long.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Atom<'a> {
    pub size: u32,
    pub name: [u8; 4],
    pub content: &'a [u8],
}

impl<'a> Atom<'a> {
    pub fn is(&self, name: &[u8; 4]) -> bool {
        &self.name == name
    }

    /// The boxes nested inside this one.
    pub fn children(&self) -> Vec<Atom<'a>> {
        parse_atoms(self.content)
    }

    /// The first nested box with the given type.
    pub fn child(&self, name: &[u8; 4]) -> Option<Atom<'a>> {
        parse_atoms(self.content).into_iter().find(|atom| atom.is(name))
    }
}

impl std::fmt::Debug for Atom<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atom")
            .field("size", &self.size)
            .field("name", &format_fourcc(&self.name))
            .field("content", &format_capped_bytes(self.content))
            .finish()
    }
}

/// Walks the boxes laid out back to back in `data`, starting at offset 0.
///
/// Parsing stops at the first box whose header does not fit, whose size is smaller than its
/// header, or whose size runs past the end of the buffer. The boxes read up to that point are
/// returned; callers treat a missing box as "not found" rather than as a hard failure.
/// 64-bit extended sizes (`size == 1`) are not supported and stop the walk like any other
/// undersized box.
pub fn parse_atoms(data: &[u8]) -> Vec<Atom<'_>> {
    let mut atoms = Vec::new();
    let mut offset = 0;

    while data.len() - offset >= ATOM_HEADER_SIZE {
        let header = &data[offset..offset + ATOM_HEADER_SIZE];
        let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let name = [header[4], header[5], header[6], header[7]];

        let end = match offset.checked_add(size as usize) {
            Some(end) if size as usize >= ATOM_HEADER_SIZE && end <= data.len() => end,
            _ => break,
        };

        atoms.push(Atom {
            size,
            name,
            content: &data[offset + ATOM_HEADER_SIZE..end],
        });
        offset = end;
    }

    atoms
}

/// Follows `path` down the box tree, taking the first box with the requested type at every
/// level. Returns `None` as soon as one level misses, or when `path` is empty.
pub fn find_atom<'a>(data: &'a [u8], path: &[&[u8; 4]]) -> Option<Atom<'a>> {
    let mut current: Option<Atom<'a>> = None;

    for name in path {
        let level = current.map_or(data, |atom| atom.content);
        current = Some(parse_atoms(level).into_iter().find(|atom| atom.is(name))?);
    }

    current
}
