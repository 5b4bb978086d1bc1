//! allocator - random probe-until-free allocation of TEIDs and subscriber host numbers
//!
//! Candidates are drawn uniformly from the range and redrawn while taken.  This is cheap
//! while the occupied set is a small fraction of the range, which is the normal case for
//! TEIDs.  As a range approaches exhaustion (a /24 APN subnet only has 253 usable hosts)
//! the expected number of draws grows without bound, so probing gives up after a fixed
//! number of attempts.  Small ranges then fall back to picking at random from the
//! explicit list of free values, which fails only when the range is genuinely full.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

/// Ranges at most this big get the free-list fallback.
pub const FREE_LIST_THRESHOLD: u64 = 4096;

const DEFAULT_MAX_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPolicy {
    // Random draws before giving up on probing.
    pub max_attempts: u32,

    // Valid values for both cp_teids and dp_teids.
    pub teid_range: RangeInclusive<u32>,

    // Valid final octets of a subscriber address.  The gateway's own host number is
    // always skipped.
    pub host_range: RangeInclusive<u8>,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        AllocationPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            teid_range: 1..=0xffff_fffe,
            host_range: 2..=254,
        }
    }
}

/// Allocate a value in `range` for which `is_taken` is false.  Zero is reserved in every
/// space this allocates from and is never returned.  Returns None if no free value could
/// be found.
pub fn allocate<R: Rng + ?Sized>(
    rng: &mut R,
    range: RangeInclusive<u32>,
    max_attempts: u32,
    is_taken: impl Fn(u32) -> bool,
) -> Option<u32> {
    if range.is_empty() {
        return None;
    }
    let is_taken = |v: u32| v == 0 || is_taken(v);
    for _ in 0..max_attempts.max(1) {
        let candidate = rng.random_range(range.clone());
        if !is_taken(candidate) {
            return Some(candidate);
        }
    }

    let size = (*range.end() as u64) - (*range.start() as u64) + 1;
    if size > FREE_LIST_THRESHOLD {
        return None;
    }
    let free: Vec<u32> = range.filter(|v| !is_taken(*v)).collect();
    free.choose(rng).copied()
}

/// Allocate a subscriber address in the /24 of `gateway`.  The network, broadcast and
/// gateway host numbers are never returned, whatever the policy's host range.
pub fn allocate_host_address<R: Rng + ?Sized>(
    rng: &mut R,
    gateway: Ipv4Addr,
    policy: &AllocationPolicy,
    is_taken: impl Fn(Ipv4Addr) -> bool,
) -> Option<Ipv4Addr> {
    let gateway_host = gateway.octets()[3];
    let range = (*policy.host_range.start() as u32)..=(*policy.host_range.end() as u32);
    allocate(rng, range, policy.max_attempts, |host| {
        host > 254 || host as u8 == gateway_host || is_taken(host_address(gateway, host as u8))
    })
    .map(|host| host_address(gateway, host as u8))
}

fn host_address(gateway: Ipv4Addr, host: u8) -> Ipv4Addr {
    let mut octets = gateway.octets();
    octets[3] = host;
    Ipv4Addr::from(octets)
}

/// True if `address` is a usable host in the /24 of `gateway` - i.e. the first three
/// octets match and it is not the network, broadcast or gateway address.
pub fn in_gateway_subnet(gateway: Ipv4Addr, address: Ipv4Addr) -> bool {
    let (g, a) = (gateway.octets(), address.octets());
    g[0..3] == a[0..3] && a[3] != 0 && a[3] != 255 && a[3] != g[3]
}
