//! 数据传输对象模块

pub mod donations;

pub use donations::{
    AvailabilityParams, AvailabilityResponse, CreateDonationRequest, ExportRequest,
    SendEmailsRequest, UpdateDonationRequest,
};
