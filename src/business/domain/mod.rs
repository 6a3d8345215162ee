//! 领域模型模块
//!
//! 定义业务领域的核心实体和值对象

pub mod donation;
pub mod event;

pub use donation::{
    is_slot_available, Donation, DonationPatch, DonationStatus, NewDonation, Title,
};
pub use event::DonationEvent;
