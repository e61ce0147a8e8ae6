pub mod icmp;
pub mod tcp;
