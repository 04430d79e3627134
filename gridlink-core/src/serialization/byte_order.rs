//! Byte order configuration for serialization streams.

/// Byte order applied to every multi-byte primitive of a stream.
///
/// Fixed at stream construction and uniform for the stream's lifetime.
/// The grid's serialization format defaults to big-endian; the setting is
/// consumed from the client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Network byte order, the serialization default.
    #[default]
    BigEndian,
    /// Little-endian, for clusters configured accordingly.
    LittleEndian,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_big_endian() {
        assert_eq!(ByteOrder::default(), ByteOrder::BigEndian);
    }

    #[test]
    fn test_copy_and_eq() {
        let order = ByteOrder::LittleEndian;
        let copy = order;
        assert_eq!(order, copy);
        assert_ne!(order, ByteOrder::BigEndian);
    }
}
