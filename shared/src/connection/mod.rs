pub mod packet_type;
pub mod system_packet;
