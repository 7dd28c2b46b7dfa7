//! Static catalog of known modpacks.
//!
//! The pack API offers no listing endpoint, so this table is maintained by
//! hand. Watch <https://github.com/FTBTeam/FTB-App/issues/103> for changes.

pub struct Pack {
    pub name: &'static str,
    pub id: u32,
}

/// Known packs and their ids.
pub const KNOWN_PACKS: &[Pack] = &[Pack {
    name: "FTB Interactions",
    id: 5,
}];

/// Looks a pack up by id.
pub fn find(id: u32) -> Option<&'static Pack> {
    KNOWN_PACKS.iter().find(|pack| pack.id == id)
}

/// Renders the catalog listing, one `name : id` line per pack.
pub fn listing() -> String {
    let mut out = String::from("Listing available packs\n=======================\n");
    for pack in KNOWN_PACKS {
        out.push_str(&format!("{} : {}\n", pack.name, pack.id));
    }
    out
}
