//! Parsers for the panel's listing pages: accounts, domains, DNS records.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::core::models::{Account, DeleteHandle, DnsRecord};

/// Reserved sub-route under `/domains/` that is not a domain name.
const CREATE_ROUTE: &str = "create";

static ACCOUNT_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="/accounts/"]"#).expect("account link selector. This is a bug.")
});
static DOMAIN_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="/domains/"]"#).expect("domain link selector. This is a bug.")
});
static RECORD_ROW: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table tbody tr").expect("record row selector. This is a bug.")
});
static ROW_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("row cell selector. This is a bug."));
static ROW_FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("row form selector. This is a bug."));

static ACCOUNT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/accounts/(if0_\d+)").expect("account id pattern. This is a bug."));
static DOMAIN_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/domains/([^/]+)/?$").expect("domain pattern. This is a bug."));

/// Accounts scraped from the dashboard listing.
///
/// Account ids follow the fixed `if0_<digits>` shape inside account-detail
/// links. Duplicate anchors to the same account are suppressed; first
/// occurrence wins, document order is preserved.
pub fn parse_accounts(html: &str) -> Vec<Account> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut accounts = Vec::new();

    for anchor in document.select(&ACCOUNT_LINK) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(captures) = ACCOUNT_ID.captures(href) else {
            continue;
        };
        let id = captures[1].to_string();
        if !seen.insert(id.clone()) {
            continue;
        }

        let text = anchor.text().collect::<String>().trim().to_string();
        let name = if text.is_empty() { id.clone() } else { text };
        accounts.push(Account { id, name });
    }

    accounts
}

/// Domain names scraped from an account-detail page.
///
/// A domain is the last path segment of a domain-detail link; the reserved
/// creation sub-route is excluded even though it matches the link pattern.
pub fn parse_domains(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut domains = Vec::new();

    for anchor in document.select(&DOMAIN_LINK) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(captures) = DOMAIN_SEGMENT.captures(href) else {
            continue;
        };
        let domain = captures[1].to_string();
        if domain == CREATE_ROUTE {
            continue;
        }
        if seen.insert(domain.clone()) {
            domains.push(domain);
        }
    }

    domains
}

/// DNS records scraped from a domain's records table.
///
/// Rows need at least host/type/target cells; a row's inline delete form, if
/// present, contributes the record's deletion handle.
pub fn parse_dns_records(html: &str) -> Vec<DnsRecord> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in document.select(&RECORD_ROW) {
        let cells: Vec<String> = row
            .select(&ROW_CELL)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        if cells.len() < 3 {
            continue;
        }

        let delete_handle = row
            .select(&ROW_FORM)
            .next()
            .and_then(|form| form.value().attr("action"))
            .map(|action| DeleteHandle(action.to_string()));

        let key = (cells[0].clone(), cells[1].clone(), cells[2].clone());
        if !seen.insert(key) {
            continue;
        }

        records.push(DnsRecord {
            host: cells[0].clone(),
            kind: cells[1].clone(),
            target: cells[2].clone(),
            delete_handle,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_deduplicated_in_first_occurrence_order() {
        let html = r#"
            <a href="/accounts/if0_40106205">primary site</a>
            <a href="/accounts/if0_40106205/settings">settings</a>
            <a href="/accounts/if0_50000001"></a>
            <a href="/accounts/create">new account</a>
        "#;
        let accounts = parse_accounts(html);
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, "if0_40106205");
        assert_eq!(accounts[0].name, "primary site");
        // Anchor without text falls back to the id.
        assert_eq!(accounts[1].id, "if0_50000001");
        assert_eq!(accounts[1].name, "if0_50000001");
    }

    #[test]
    fn domains_exclude_the_creation_route() {
        let html = r#"
            <a href="/accounts/if0_1/domains/scrapes.xo.je">scrapes.xo.je</a>
            <a href="/accounts/if0_1/domains/create">Add domain</a>
            <a href="/accounts/if0_1/domains/scrapes.xo.je">again</a>
            <a href="/accounts/if0_1/domains/mycreate.example">mycreate.example</a>
        "#;
        assert_eq!(
            parse_domains(html),
            vec!["scrapes.xo.je".to_string(), "mycreate.example".to_string()]
        );
    }

    #[test]
    fn dns_rows_yield_records_with_delete_handles() {
        let html = r#"
            <table><tbody>
              <tr>
                <td>www</td><td>CNAME</td><td>target.example.com</td>
                <td>
                  <form action="/accounts/if0_1/domains/x/dnsRecords/77/delete" method="POST">
                    <input type="hidden" name="_token" value="t">
                  </form>
                </td>
              </tr>
              <tr><td>@</td><td>TXT</td><td>v=spf1 -all</td></tr>
              <tr><td>short</td><td>row</td></tr>
            </tbody></table>
        "#;
        let records = parse_dns_records(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].host, "www");
        assert_eq!(records[0].kind, "CNAME");
        assert_eq!(records[0].target, "target.example.com");
        assert_eq!(
            records[0].delete_handle.as_ref().map(|h| h.as_str()),
            Some("/accounts/if0_1/domains/x/dnsRecords/77/delete")
        );
        assert_eq!(records[1].host, "@");
        assert!(records[1].delete_handle.is_none());
    }

    #[test]
    fn duplicate_dns_rows_are_suppressed() {
        let html = r#"
            <table><tbody>
              <tr><td>www</td><td>CNAME</td><td>t.example</td></tr>
              <tr><td>www</td><td>CNAME</td><td>t.example</td></tr>
            </tbody></table>
        "#;
        assert_eq!(parse_dns_records(html).len(), 1);
    }
}
