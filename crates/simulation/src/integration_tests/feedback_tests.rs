//! Customer feedback generated when parcels arrive.

use crate::delivery::{DeliveryStatus, Priority};
use crate::feedback::FeedbackLog;
use crate::test_harness::TestFleet;

#[test]
fn test_high_priority_delivery_rates_five_stars() {
    let mut fleet = TestFleet::new().with_fleet(1, 10.0, 20.0, 100.0);
    let id = fleet.submit(27.0, 26.0, 3.0, Priority::High).unwrap();

    fleet.tick_until(5000, |f| f.delivery_status(id) == DeliveryStatus::Delivered);
    fleet.tick(1);

    let log = fleet.resource::<FeedbackLog>();
    assert_eq!(log.entries.len(), 1);
    let entry = &log.entries[0];
    assert_eq!(entry.delivery_id, id);
    assert_eq!(entry.rating, 5);
    assert!(!entry.message.is_empty());
    assert!(entry.sim_time > 0.0);
}

#[test]
fn test_every_completed_delivery_gets_feedback() {
    let mut fleet = TestFleet::new().with_fleet(2, 10.0, 20.0, 100.0);
    let a = fleet.submit(27.0, 25.0, 2.0, Priority::Low).unwrap();
    let b = fleet.submit(25.0, 27.0, 2.0, Priority::Medium).unwrap();

    fleet.tick_until(5000, |f| {
        f.delivery_status(a) == DeliveryStatus::Delivered
            && f.delivery_status(b) == DeliveryStatus::Delivered
    });
    fleet.tick(1);

    let log = fleet.resource::<FeedbackLog>();
    assert_eq!(log.entries.len(), 2);
    for entry in &log.entries {
        assert!((4..=5).contains(&entry.rating));
    }
}
