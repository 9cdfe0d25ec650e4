pub mod auto_offset_reset;
pub mod security_protocol;
