// SPDX-License-Identifier: AGPL-3.0-only

//! Molecule names known to the databank.
//!
//! Order-parameter artifacts are written once per lipid, so the harness needs
//! to tell lipids apart from ions and solvent in a system's composition.

/// Lipid names with mapping files in the databank, sorted.
pub const LIPIDS: &[&str] = &[
    "CER",
    "CHOL",
    "CHSD",
    "DAPC",
    "DCHOL",
    "DDOPC",
    "DEPC",
    "DHMDMAB",
    "DLIPC",
    "DLPC",
    "DMPC",
    "DMTAP",
    "DOG",
    "DOPC",
    "DOPE",
    "DOPS",
    "DPPC",
    "DPPE",
    "DPPG",
    "DRPC",
    "DSPC",
    "DYPC",
    "GM1",
    "PAzePCdeprot",
    "PAzePCprot",
    "POPC",
    "POPE",
    "POPG",
    "POPI",
    "POPS",
    "PYPC",
    "SAPI",
    "SDG",
    "SDPE",
    "SLPI",
    "SM16",
    "SM18",
    "SOPC",
    "TOCL",
];

#[must_use]
pub fn is_lipid(name: &str) -> bool {
    LIPIDS.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lipid_table_is_sorted_for_binary_search() {
        assert!(LIPIDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recognises_lipids_only() {
        assert!(is_lipid("POPC"));
        assert!(is_lipid("CHOL"));
        for m in ["CAL", "CLA", "POT", "SOD", "SOL"] {
            assert!(!is_lipid(m), "{m} is not a lipid");
        }
        assert!(!is_lipid("popc"));
    }
}
