//! Resource Record (RR) TYPEs

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource Record Types.
    ///
    /// Each resource records has a 16 bit type value indicating what kind of
    /// information is represented by the record. Normal query includes the
    /// type of record information is requested for. A few aditional types,
    /// called query types, are defined as well and can only be used in
    /// questions. This type represents both these types.
    ///
    /// Only the types commonly found in signed zones have named constants.
    /// All other types are carried by value and presented as `TYPEnnn`.
    ///
    /// See the [IANA registry] for an overview of assigned values.
    ///
    /// [IANA registry]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
    =>
    Rtype, u16;

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (NS => 2, "NS")

    /// The canonical name for an alias.
    (CNAME => 5, "CNAME")

    /// Marks the start of a zone of authority.
    (SOA => 6, "SOA")

    /// A domain name pointer.
    (PTR => 12, "PTR")

    /// Mail exchange.
    (MX => 15, "MX")

    /// Text strings.
    (TXT => 16, "TXT")

    /// IPv6 address.
    (AAAA =>  28, "AAAA")

    /// Server selection.
    (SRV => 33, "SRV")

    /// DNAME.
    (DNAME => 39, "DNAME")

    /// Delegation signer.
    (DS => 43, "DS")

    /// RRSIG.
    (RRSIG => 46, "RRSIG")

    /// NSEC.
    (NSEC => 47, "NSEC")

    /// DNSKEY.
    (DNSKEY => 48, "DNSKEY")

    /// NSEC3.
    (NSEC3 => 50, "NSEC3")

    /// NSEC3PARAM.
    (NSEC3PARAM => 51, "NSEC3PARAM")

    /// TLSA.
    (TLSA => 52, "TLSA")

    /// Child DS.
    (CDS => 59, "CDS")

    /// DNSKEY(s) the child wants reflected in DS.
    (CDNSKEY => 60, "CDNSKEY")

    /// Message digest for DNS zone.
    (ZONEMD => 63, "ZONEMD")

    /// General-purpose service binding.
    (SVCB => 64, "SVCB")

    /// Service binding type for use with HTTPS.
    (HTTPS => 65, "HTTPS")

    /// Certification Authority Restriction.
    (CAA => 257, "CAA")
}

int_enum_str_with_prefix!(Rtype, "TYPE", u16, "unknown record type");

impl Rtype {
    /// Returns true if this record type is used for authenticated denial of
    /// existence, i.e., NSEC or NSEC3.
    #[must_use]
    pub fn is_denial(self) -> bool {
        matches!(self, Rtype::NSEC | Rtype::NSEC3)
    }
}

//============ Testing =======================================================
