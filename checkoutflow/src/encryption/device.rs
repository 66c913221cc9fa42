//! Device identifiers.

use rand::Rng;

fn hex(rng: &mut impl Rng, bytes: usize) -> String {
    (0..bytes).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

/// Generates a random device id shaped like the retailer's fingerprint
/// ids: `fe80xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
#[must_use]
pub fn generate_device_id() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "fe80{}-{}-{}-{}-{}",
        hex(&mut rng, 4),
        hex(&mut rng, 2),
        hex(&mut rng, 2),
        hex(&mut rng, 2),
        hex(&mut rng, 6)
    )
}

/// Returns true if `id` has the shape produced by [`generate_device_id`].
#[must_use]
pub fn is_device_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("fe80") else {
        return false;
    };
    let groups: Vec<&str> = rest.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_well_formed() {
        for _ in 0..20 {
            let id = generate_device_id();
            assert!(is_device_id(&id), "bad id {id}");
            assert_eq!(id.len(), 4 + 8 + 4 + 4 + 4 + 12 + 4);
        }
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_device_id(), generate_device_id());
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(!is_device_id("abc"));
        assert!(!is_device_id("fe80zzzzzzzz-0000-0000-0000-000000000000"));
        assert!(!is_device_id("fe8000000000-0000-0000-000000000000"));
    }
}
