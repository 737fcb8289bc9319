pub const RLP_NULL: u8 = 0x80;
pub const RLP_EMPTY_LIST: u8 = 0xc0;
