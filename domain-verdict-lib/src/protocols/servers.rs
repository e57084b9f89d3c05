//! WHOIS server directory for TLD routing.
//!
//! Maps TLDs to their registry WHOIS services. TLDs without an entry fall
//! back to the IANA server, which answers for every delegated TLD and often
//! refers to the registry-level server in its response (the prober follows
//! such referrals).

use std::collections::HashMap;

use crate::error::DomainCheckError;

/// Fallback WHOIS service for TLDs without a dedicated entry.
pub const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";

// Static TLD table using lazy_static
lazy_static::lazy_static! {
    /// TLD -> registry WHOIS server hostname.
    static ref WHOIS_SERVERS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();

        // Generic TLDs
        m.insert("com", "whois.verisign-grs.com");
        m.insert("net", "whois.verisign-grs.com");
        m.insert("org", "whois.pir.org");
        m.insert("info", "whois.afilias.net");
        m.insert("biz", "whois.biz");
        m.insert("name", "whois.nic.name");
        m.insert("mobi", "whois.afilias.net");
        m.insert("asia", "whois.nic.asia");
        m.insert("cat", "whois.nic.cat");
        m.insert("coop", "whois.nic.coop");
        m.insert("edu", "whois.educause.edu");
        m.insert("gov", "whois.dotgov.gov");
        m.insert("int", "whois.iana.org");
        m.insert("jobs", "whois.nic.jobs");
        m.insert("museum", "whois.museum");
        m.insert("tel", "whois.nic.tel");
        m.insert("travel", "whois.nic.travel");

        // New gTLDs
        m.insert("app", "whois.nic.google");
        m.insert("dev", "whois.nic.google");
        m.insert("page", "whois.nic.google");
        m.insert("blog", "whois.nic.blog");
        m.insert("cloud", "whois.nic.cloud");
        m.insert("io", "whois.nic.io");
        m.insert("co", "whois.nic.co");
        m.insert("me", "whois.nic.me");
        m.insert("tv", "whois.nic.tv");
        m.insert("cc", "ccwhois.verisign-grs.com");
        m.insert("xyz", "whois.nic.xyz");
        m.insert("online", "whois.nic.online");
        m.insert("site", "whois.nic.site");
        m.insert("tech", "whois.nic.tech");
        m.insert("store", "whois.nic.store");
        m.insert("shop", "whois.nic.shop");
        m.insert("ai", "whois.nic.ai");
        m.insert("gg", "whois.gg");
        m.insert("world", "whois.nic.world");
        m.insert("email", "whois.nic.email");
        m.insert("digital", "whois.nic.digital");
        m.insert("network", "whois.nic.network");
        m.insert("agency", "whois.nic.agency");
        m.insert("company", "whois.nic.company");
        m.insert("solutions", "whois.nic.solutions");
        m.insert("systems", "whois.nic.systems");
        m.insert("services", "whois.nic.services");
        m.insert("studio", "whois.nic.studio");
        m.insert("design", "whois.nic.design");
        m.insert("media", "whois.nic.media");
        m.insert("software", "whois.nic.software");
        m.insert("technology", "whois.nic.technology");
        m.insert("live", "whois.nic.live");
        m.insert("news", "whois.nic.news");
        m.insert("life", "whois.nic.life");
        m.insert("art", "whois.nic.art");
        m.insert("games", "whois.nic.games");
        m.insert("fun", "whois.nic.fun");
        m.insert("zone", "whois.nic.zone");
        m.insert("space", "whois.nic.space");
        m.insert("global", "whois.nic.global");
        m.insert("money", "whois.nic.money");
        m.insert("finance", "whois.nic.finance");
        m.insert("capital", "whois.nic.capital");
        m.insert("exchange", "whois.nic.exchange");
        m.insert("business", "whois.nic.business");
        m.insert("ventures", "whois.nic.ventures");
        m.insert("group", "whois.nic.group");
        m.insert("team", "whois.nic.team");
        m.insert("partners", "whois.nic.partners");
        m.insert("work", "whois.nic.work");
        m.insert("works", "whois.nic.works");

        // Country-code TLDs
        m.insert("ae", "whois.aeda.net.ae");
        m.insert("ar", "whois.nic.ar");
        m.insert("at", "whois.nic.at");
        m.insert("au", "whois.auda.org.au");
        m.insert("be", "whois.dns.be");
        m.insert("br", "whois.registro.br");
        m.insert("ca", "whois.cira.ca");
        m.insert("ch", "whois.nic.ch");
        m.insert("cl", "whois.nic.cl");
        m.insert("cn", "whois.cnnic.cn");
        m.insert("cz", "whois.nic.cz");
        m.insert("de", "whois.denic.de");
        m.insert("dk", "whois.dk-hostmaster.dk");
        m.insert("ee", "whois.tld.ee");
        m.insert("es", "whois.nic.es");
        m.insert("eu", "whois.eu");
        m.insert("fi", "whois.fi");
        m.insert("fr", "whois.nic.fr");
        m.insert("gr", "whois.nic.gr");
        m.insert("hk", "whois.hkirc.hk");
        m.insert("hr", "whois.dns.hr");
        m.insert("hu", "whois.nic.hu");
        m.insert("id", "whois.id");
        m.insert("ie", "whois.iedr.ie");
        m.insert("il", "whois.isoc.org.il");
        m.insert("in", "whois.registry.in");
        m.insert("is", "whois.isnic.is");
        m.insert("it", "whois.nic.it");
        m.insert("jp", "whois.jprs.jp");
        m.insert("kr", "whois.kr");
        m.insert("li", "whois.nic.li");
        m.insert("lt", "whois.domreg.lt");
        m.insert("lu", "whois.dns.lu");
        m.insert("lv", "whois.nic.lv");
        m.insert("mx", "whois.mx");
        m.insert("my", "whois.mynic.my");
        m.insert("nl", "whois.domain-registry.nl");
        m.insert("no", "whois.norid.no");
        m.insert("nz", "whois.srs.net.nz");
        m.insert("ph", "whois.nic.ph");
        m.insert("pl", "whois.dns.pl");
        m.insert("pt", "whois.dns.pt");
        m.insert("ro", "whois.rotld.ro");
        m.insert("ru", "whois.tcinet.ru");
        m.insert("se", "whois.iis.se");
        m.insert("sg", "whois.sgnic.sg");
        m.insert("si", "whois.register.si");
        m.insert("sk", "whois.sk-nic.sk");
        m.insert("th", "whois.thnic.co.th");
        m.insert("tr", "whois.trabis.gov.tr");
        m.insert("tw", "whois.twnic.net.tw");
        m.insert("ua", "whois.ua");
        m.insert("uk", "whois.nic.uk");
        m.insert("us", "whois.nic.us");
        m.insert("vn", "whois.nic.vn");
        m.insert("za", "whois.registry.net.za");

        m
    };
}

/// Look up the registry WHOIS server for a TLD.
///
/// Returns `None` for TLDs not in the built-in table; callers should fall
/// back to [`DEFAULT_WHOIS_SERVER`].
pub fn get_whois_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld.to_lowercase().as_str()).copied()
}

/// Extract the TLD (last label) from a domain name.
///
/// Multi-level public suffixes route through their top label: `example.co.uk`
/// is served by the `uk` registry.
pub fn extract_tld(domain: &str) -> Result<String, DomainCheckError> {
    if !domain.contains('.') {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "domain has no TLD",
        ));
    }

    match domain.rsplit('.').next() {
        Some(tld) if !tld.is_empty() => Ok(tld.to_lowercase()),
        _ => Err(DomainCheckError::invalid_domain(domain, "domain has no TLD")),
    }
}

/// Pick the WHOIS server for a domain: the per-TLD entry, or the IANA default.
pub fn resolve_whois_server(domain: &str) -> Result<&'static str, DomainCheckError> {
    let tld = extract_tld(domain)?;
    Ok(get_whois_server(&tld).unwrap_or(DEFAULT_WHOIS_SERVER))
}
