//! DNSSEC Algorithm Numbers

//------------ SecAlg -------------------------------------------------------

int_enum! {
    /// Security Algorithm Numbers.
    ///
    /// These numbers are used in the DNSKEY and RRSIG record types as well
    /// as in the key directives of the signer input.
    ///
    /// For the currently registered values see the [IANA registration].
    ///
    /// [IANA registration]: http://www.iana.org/assignments/dns-sec-alg-numbers/dns-sec-alg-numbers.xhtml#dns-sec-alg-numbers-1
    =>
    SecAlg, u8;

    /// RSA/SHA-1
    (RSASHA1 => 5, "RSASHA1")

    /// RSASHA1-NSEC3-SHA1
    ///
    /// This value is an alias for `RSASHA1` for use within NSEC3 records.
    (RSASHA1_NSEC3_SHA1 => 7, "RSASHA1-NSEC3-SHA1")

    /// RSA/SHA-256
    (RSASHA256 => 8, "RSASHA256")

    /// RSA/SHA-512
    (RSASHA512 => 10, "RSASHA512")

    /// GOST R 34.10-2001
    (ECC_GOST => 12, "ECC-GOST")

    /// ECDSA Curve P-256 with SHA-256
    (ECDSAP256SHA256 => 13, "ECDSAP256SHA256")

    /// ECDSA Curve P-384 with SHA-384
    (ECDSAP384SHA384 => 14, "ECDSAP384SHA384")

    /// ED25519
    (ED25519 => 15, "ED25519")

    /// ED448
    (ED448 => 16, "ED448")
}

int_enum_str_with_decimal!(SecAlg, u8, "unknown algorithm");

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn mnemonic_or_number() {
        assert_eq!(SecAlg::from_str("8").unwrap(), SecAlg::RSASHA256);
        assert_eq!(SecAlg::from_str("ed25519").unwrap(), SecAlg::ED25519);
        assert_eq!(SecAlg::from_str("253").unwrap().to_int(), 253);
        assert!(SecAlg::from_str("256").is_err());
        assert_eq!(format!("{}", SecAlg::from_int(253)), "253");
    }
}
