//! Policy search command handler.

use anyhow::{Context, Result, bail};
use ieum_core::api::BackendClient;
use ieum_core::search::{
    ALL_DISTRICTS, FilterForm, MaritalStatus, PROVINCES, Province, TagRowKind,
};

/// Filters collected from the command line.
pub struct SearchOptions {
    pub query: String,
    pub exclude_closed: bool,
    pub regions: Vec<String>,
    pub marital_status: MaritalStatus,
    pub age: Option<u32>,
    pub income_min: Option<u32>,
    pub income_max: Option<u32>,
    pub tags: Vec<(TagRowKind, String)>,
    pub json: bool,
}

pub async fn run(client: &BackendClient, options: SearchOptions) -> Result<()> {
    let form = build_form(&options)?;
    let request = form.to_request();
    tracing::debug!(?request, "policy search");

    let response = client
        .search_policies(&request)
        .await
        .context("policy search failed")?;

    if options.json {
        let json = serde_json::to_string_pretty(&response.results)
            .context("serialize search results")?;
        println!("{json}");
        return Ok(());
    }

    println!("지역: {}", form.region.summary());
    println!("총 {}개의 정책을 찾았습니다.", response.count);
    for policy in &response.results {
        println!();
        println!("[{}] {}", policy.id, policy.title);
        let region = policy.region.as_deref().unwrap_or("-");
        let period = policy.period.as_deref().unwrap_or("-");
        println!("    {region} | {period}");
        if !policy.description.is_empty() {
            println!("    {}", policy.description);
        }
        if let Some(url) = policy.url.as_deref().filter(|u| !u.is_empty()) {
            println!("    {url}");
        }
    }
    Ok(())
}

/// Prints every filter value accepted by `search`.
pub fn print_options() {
    for kind in TagRowKind::ALL {
        println!("{}: {}", kind.label(), kind.options().join(", "));
    }
    println!("지역:");
    for province in PROVINCES {
        println!("  {} ({})", province.key, province.name);
    }
}

fn build_form(options: &SearchOptions) -> Result<FilterForm> {
    let mut form = FilterForm::new();
    form.query.clone_from(&options.query);
    form.exclude_closed = options.exclude_closed;
    form.marital_status = options.marital_status;
    form.age = options.age;
    form.income_min = options.income_min;
    form.income_max = options.income_max;

    for (kind, value) in &options.tags {
        if !form.select_tag(*kind, value) {
            bail!(
                "Unknown {} '{value}'. Options: {}",
                kind.label(),
                kind.options().join(", ")
            );
        }
    }

    for region in &options.regions {
        add_region(&mut form, region)?;
    }
    Ok(form)
}

/// Adds `PROVINCE` or `PROVINCE:DISTRICT`; the province may be a key or a
/// Korean name.
fn add_region(form: &mut FilterForm, value: &str) -> Result<()> {
    let (province, district) = match value.split_once(':') {
        Some((province, district)) => (province.trim(), district.trim()),
        None => (value.trim(), ALL_DISTRICTS),
    };

    let Some(province) = Province::lookup(province) else {
        let keys: Vec<_> = PROVINCES.iter().map(|p| p.key).collect();
        bail!("Unknown region '{province}'. Regions: {}", keys.join(", "));
    };
    if !province.has_district(district) {
        bail!("Unknown district '{district}' in {}", province.name);
    }

    form.region.select_province(province.key);
    // A repeated region is ignored.
    form.region.select_district(district);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SearchOptions {
        SearchOptions {
            query: String::new(),
            exclude_closed: false,
            regions: Vec::new(),
            marital_status: MaritalStatus::Any,
            age: None,
            income_min: None,
            income_max: None,
            tags: Vec::new(),
            json: false,
        }
    }

    #[test]
    fn test_region_by_key_and_name() {
        let mut opts = options();
        opts.regions = vec!["서울:강남구".to_string(), "busan".to_string()];

        let form = build_form(&opts).unwrap();
        let displays: Vec<_> = form.region.tags().iter().map(|t| t.display.as_str()).collect();
        assert_eq!(displays, vec!["서울 강남구", "부산"]);
        assert_eq!(form.to_request().region, "seoul");
    }

    #[test]
    fn test_unknown_region_rejected() {
        let mut opts = options();
        opts.regions = vec!["mars".to_string()];
        let err = build_form(&opts).unwrap_err();
        assert!(err.to_string().contains("Unknown region 'mars'"));

        opts.regions = vec!["jeju:강남구".to_string()];
        assert!(build_form(&opts).is_err());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut opts = options();
        opts.tags = vec![(TagRowKind::Major, "마법학".to_string())];
        let err = build_form(&opts).unwrap_err();
        assert!(err.to_string().contains("전공요건"));
    }
}
