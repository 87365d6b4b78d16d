use rand::Rng;
use time::{Duration, OffsetDateTime};

pub const OTP_TTL_MINUTES: i64 = 10;

/// Random 6-digit numeric code, uniform over [100000, 999999].
pub fn generate() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub fn expiry_time(minutes: i64) -> OffsetDateTime {
    OffsetDateTime::now_utc() + Duration::minutes(minutes)
}

/// An absent expiry counts as expired.
pub fn is_expired(expires: Option<OffsetDateTime>) -> bool {
    match expires {
        Some(t) => OffsetDateTime::now_utc() > t,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric code");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn expiry_lands_in_the_future() {
        let expires = expiry_time(OTP_TTL_MINUTES);
        let delta = expires - OffsetDateTime::now_utc();
        assert!(delta > Duration::minutes(9));
        assert!(delta <= Duration::minutes(10));
    }

    #[test]
    fn missing_expiry_is_expired() {
        assert!(is_expired(None));
    }

    #[test]
    fn past_expiry_is_expired() {
        let past = OffsetDateTime::now_utc() - Duration::minutes(1);
        assert!(is_expired(Some(past)));
    }

    #[test]
    fn future_expiry_is_live() {
        let future = OffsetDateTime::now_utc() + Duration::minutes(5);
        assert!(!is_expired(Some(future)));
    }
}
