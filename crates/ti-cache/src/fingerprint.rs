//! The leadfield cache key (spec §4.3): `(subject_id, net_name,
//! solver_version, electrode_convention_version, reference_electrode)`.
//! The reference electrode is part of the fingerprint because its choice
//! changes every row in the tensor (all fields are measured relative to
//! it).

use crc32fast::Hasher;

/// Identifies exactly one leadfield build. Two fingerprints that compare
/// equal are guaranteed to produce byte-identical leadfields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub subject_id: String,
    pub net_name: String,
    pub solver_version: String,
    pub electrode_convention_version: String,
    pub reference_electrode: String,
}

impl Fingerprint {
    /// A stable content-address for this fingerprint, used as the cache
    /// file's name. Not cryptographic — collisions would require two
    /// distinct fingerprints sharing a CRC32, which a content check at
    /// read time (the embedded header, see [`crate::format`]) would still
    /// catch.
    ///
    /// # Example
    ///
    /// ```
    /// use ti_cache::fingerprint::Fingerprint;
    ///
    /// let fp = Fingerprint {
    ///     subject_id: "sub-01".into(),
    ///     net_name: "EEG10-20".into(),
    ///     solver_version: "mock-1".into(),
    ///     electrode_convention_version: "v1".into(),
    ///     reference_electrode: "Pz".into(),
    /// };
    /// assert_eq!(fp.digest(), fp.clone().digest());
    /// ```
    pub fn digest(&self) -> u32 {
        let mut hasher = Hasher::new();
        for field in [
            &self.subject_id,
            &self.net_name,
            &self.solver_version,
            &self.electrode_convention_version,
            &self.reference_electrode,
        ] {
            hasher.update(field.as_bytes());
            hasher.update(&[0u8]); // field separator, avoids "ab"+"c" == "a"+"bc" collisions
        }
        hasher.finalize()
    }

    pub fn file_name(&self) -> String {
        format!("{:08x}.leadfield", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fingerprint {
        Fingerprint {
            subject_id: "sub-01".into(),
            net_name: "EEG10-20".into(),
            solver_version: "mock-1".into(),
            electrode_convention_version: "v1".into(),
            reference_electrode: "Pz".into(),
        }
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(sample().digest(), sample().digest());
    }

    #[test]
    fn different_reference_electrode_changes_digest() {
        let mut other = sample();
        other.reference_electrode = "Cz".into();
        assert_ne!(sample().digest(), other.digest());
    }

    #[test]
    fn field_boundary_does_not_collide() {
        let mut a = sample();
        a.subject_id = "ab".into();
        a.net_name = "c".into();
        let mut b = sample();
        b.subject_id = "a".into();
        b.net_name = "bc".into();
        assert_ne!(a.digest(), b.digest());
    }
}
