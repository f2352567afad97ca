use conquest_shared::map::{RegionId, EDGES};
use conquest_shared::party::PartyId;
use conquest_shared::Region;
use enum_map::EnumMap;

/// Whether `origin` and `destination` are connected by a path of regions
/// all owned by `party`. A region is trivially connected to itself, even
/// when the party owns neither endpoint.
pub fn friendly_connection(
    regions: &EnumMap<RegionId, Region>,
    party: PartyId,
    origin: RegionId,
    destination: RegionId,
) -> bool {
    let mut seen: EnumMap<RegionId, bool> = EnumMap::default();
    let mut stack = vec![origin];

    while let Some(region) = stack.pop() {
        if region == destination {
            return true;
        }
        if regions[region].owner != Some(party) || seen[region] {
            continue;
        }
        seen[region] = true;
        stack.extend(EDGES[region].iter().copied().filter(|&x| !seen[x]));
    }

    false
}
