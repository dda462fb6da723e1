/// RLP encoding of the empty byte string (and of integer zero).
pub const RLP_NULL: u8 = 0x80;
/// RLP encoding of the empty list.
pub const RLP_EMPTY_LIST: u8 = 0xc0;
