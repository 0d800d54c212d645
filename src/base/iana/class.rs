//! DNS CLASSes.

//------------ Class ---------------------------------------------------------

int_enum! {
    /// DNS CLASSes.
    ///
    /// The domain name space is partitioned into separate classes for
    /// different network types. In practice, only the IN class is really
    /// relevant and zones are signed per class.
    ///
    /// [DNS CLASSes IANA registry]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-2
    =>
    Class, u16;

    /// Internet (IN).
    (IN => 1, "IN")

    /// Chaosnet (CH).
    (CH => 3, "CH")

    /// Hesiod (HS).
    (HS => 4, "HS")
}

int_enum_str_with_prefix!(Class, "CLASS", u16, "unknown class");

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn from_str() {
        assert_eq!(Class::from_str("in").unwrap(), Class::IN);
        assert_eq!(Class::from_str("CLASS3").unwrap(), Class::CH);
        assert_eq!(Class::from_str("CLASS42").unwrap().to_int(), 42);
        assert!(Class::from_str("CLASS").is_err());
        assert!(Class::from_str("INX").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Class::IN), "IN");
        assert_eq!(format!("{}", Class::from_int(42)), "CLASS42");
    }
}
