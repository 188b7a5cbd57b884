use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use pegnode::chain::{ChainParams, Network};
use pegnode::feed::{FeedPrice, FeedPriceSource};

#[test]
fn feed_goes_stale_after_one_regtest_block() {
    let params = ChainParams::for_network(Network::Regtest);
    let feed = FeedPrice::new(params.target_time_per_block);

    let observed = Utc::now();
    feed.feed_price_at(1.02, observed);
    assert_eq!(
        feed.price_to_mine_at(observed + Duration::minutes(10)),
        Some(1.02)
    );
    assert_eq!(
        feed.price_to_mine_at(observed + Duration::minutes(10) + Duration::seconds(1)),
        None
    );
}

#[test]
fn shared_feed_serves_latest_price() {
    let feed: Arc<dyn FeedPriceSource> = Arc::new(FeedPrice::new(Duration::minutes(5)));
    let writer = {
        let feed = Arc::clone(&feed);
        thread::spawn(move || {
            for step in 1..=10 {
                feed.feed_price(f64::from(step));
            }
        })
    };
    writer.join().unwrap();

    assert_eq!(feed.price_to_mine(), Some(10.0));
    assert_eq!(feed.last_price().map(|sample| sample.price), Some(10.0));
}
