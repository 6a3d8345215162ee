//! 实时事件

use serde::{Deserialize, Serialize};

use super::Donation;
use crate::shared::constants::events;

/// 每次变更成功后广播给所有订阅者的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum DonationEvent {
    #[serde(rename = "donationAdded")]
    Added(Donation),
    #[serde(rename = "donationUpdated")]
    Updated(Donation),
}

impl DonationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DonationEvent::Added(_) => events::DONATION_ADDED,
            DonationEvent::Updated(_) => events::DONATION_UPDATED,
        }
    }

    pub fn donation(&self) -> &Donation {
        match self {
            DonationEvent::Added(d) | DonationEvent::Updated(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{NewDonation, Title};

    #[test]
    fn test_wire_shape() {
        let donation = Donation::from_submission(
            uuid::Uuid::new_v4(),
            NewDonation::new(Title::Ms),
            chrono::Utc::now(),
        );
        let event = DonationEvent::Added(donation.clone());
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], "donationAdded");
        assert_eq!(value["data"]["_id"], donation.id.to_string());
        assert_eq!(event.name(), value["event"]);
    }
}
