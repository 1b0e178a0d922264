use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::physics::Obstacle;

/// SHA-256 over obstacle kinds, rectangle bits and pad power, in order.
/// Identifies the exact geometry a report was produced from.
pub fn course_fingerprint(obstacles: &[Obstacle]) -> String {
    let mut hasher = Sha256::new();
    for obstacle in obstacles {
        hasher.update(obstacle.kind.keyword().as_bytes());
        hasher.update([0u8]);
        for value in [
            obstacle.rect.x,
            obstacle.rect.y,
            obstacle.rect.w,
            obstacle.rect.h,
        ] {
            hasher.update(value.to_bits().to_le_bytes());
        }
        match obstacle.power {
            Some(power) => {
                hasher.update([1u8]);
                hasher.update(power.to_bits().to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
    }
    to_hex_lower(&hasher.finalize())
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_order_and_value_sensitive() {
        let a = Obstacle::platform(0.0, 0.0, 100.0, 20.0);
        let b = Obstacle::spike(50.0, 20.0, 10.0, 10.0);
        let base = course_fingerprint(&[a, b]);
        assert_eq!(base.len(), 64);
        assert_eq!(base, course_fingerprint(&[a, b]));
        assert_ne!(base, course_fingerprint(&[b, a]));

        let nudged = Obstacle::spike(50.0, 20.0, 10.0, 10.000_001);
        assert_ne!(base, course_fingerprint(&[a, nudged]));
    }

    #[test]
    fn pad_power_presence_matters() {
        let unset = Obstacle::jump_pad(0.0, 0.0, 10.0, 16.0, None);
        let zero = Obstacle::jump_pad(0.0, 0.0, 10.0, 16.0, Some(0.0));
        assert_ne!(course_fingerprint(&[unset]), course_fingerprint(&[zero]));
    }
}
