//! Command implementations.

use directories::ProjectDirs;
use rumahsubsidi_client::geo::NoLocation;
use rumahsubsidi_client::{
    Coordinates, DetectOutcome, FetchClient, FetchConfig, FileRegionStore, FixedLocation, LocationProvider,
    NominatimGeocoder, ProxyClient, RegionDetector, SearchQuery, SikumbangApi, SikumbangClient,
};
use rumahsubsidi_core::{AppConfig, Error, TtlCache};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{Command, DetectArgs, SearchArgs};

/// Resolved settings shared by every command.
pub struct Context {
    pub config: AppConfig,
    pub proxy_url: String,
}

impl Context {
    pub fn new(config: AppConfig, proxy: Option<String>) -> Self {
        let proxy_url = proxy.unwrap_or_else(|| format!("http://localhost:{}", config.server.port));
        Self { config, proxy_url }
    }

    fn api(&self) -> Result<SikumbangApi, Error> {
        let cache = TtlCache::new(self.config.cache.ttl(), self.config.cache.max_entries);
        if let Some(interval) = self.config.cache.sweep_interval() {
            cache.spawn_sweeper(interval);
        }
        let fetch = FetchClient::new(
            FetchConfig {
                base_url: self.config.sikumbang.base_url.clone(),
                user_agent: self.config.http.user_agent.clone(),
                ..Default::default()
            },
            cache,
        )?;
        Ok(SikumbangApi::new(fetch))
    }

    fn proxy(&self) -> Result<ProxyClient, Error> {
        ProxyClient::new(&self.proxy_url, Some(self.config.pkp.timeout()))
    }
}

/// Run `command` and return the JSON document to print.
pub async fn run(ctx: &Context, command: Command) -> Result<Value, Error> {
    match command {
        Command::CekNik { nik } => cek_nik(ctx, &nik).await,
        Command::Detail { id, direct } => detail(ctx, &id, direct).await,
        Command::Provinces => Ok(json!(ctx.api()?.provinces().await?)),
        Command::Regencies { code } => Ok(json!(ctx.api()?.regencies(&code).await?)),
        Command::Districts { code } => Ok(json!(ctx.api()?.districts(&code).await?)),
        Command::Search(args) => search(ctx, &args).await,
        Command::DetectRegion(args) => detect_region(ctx, &args).await,
    }
}

async fn cek_nik(ctx: &Context, nik: &str) -> Result<Value, Error> {
    let outcome = ctx.proxy()?.check_eligibility(nik).await?;
    Ok(json!({
        "headline": outcome.headline(),
        "eligible": outcome.is_eligible(),
        "outcome": outcome,
    }))
}

async fn detail(ctx: &Context, id: &str, direct: bool) -> Result<Value, Error> {
    if direct {
        SikumbangClient::new(&ctx.config.sikumbang, &ctx.config.http)?.detail(id).await
    } else {
        ctx.proxy()?.listing_detail(id).await
    }
}

async fn search(ctx: &Context, args: &SearchArgs) -> Result<Value, Error> {
    let mut query = SearchQuery { page: args.page, ..Default::default() };
    if let Some(region) = &args.region {
        query = query.in_region(region.as_str());
    }

    let response = ctx.api()?.search(&query).await?;
    let listings = args.filter().apply(&response.data);

    Ok(json!({
        "count": listings.len(),
        "stats": response.count,
        "listings": listings,
    }))
}

async fn detect_region(ctx: &Context, args: &DetectArgs) -> Result<Value, Error> {
    let api = ctx.api()?;
    let provinces = api.provinces().await?;

    let geocoder = NominatimGeocoder::new(&ctx.config.geo.geocoder_url, &ctx.config.http.user_agent)?;
    let store = FileRegionStore::new(store_path(args.store.clone()));
    let location: Arc<dyn LocationProvider> = {
        let coords = Coordinates::new(args.lat, args.lon);
        if coords.is_valid() { Arc::new(FixedLocation(coords)) } else { Arc::new(NoLocation) }
    };

    let detector =
        RegionDetector::new(location, Arc::new(geocoder), Arc::new(store)).with_config(&ctx.config.geo);
    if args.reset {
        detector.reset().await?;
    }

    Ok(match detector.detect_region(&provinces).await {
        DetectOutcome::Detected { region, source } => json!({
            "detected": true,
            "region": region,
            "source": format!("{source:?}").to_lowercase(),
        }),
        DetectOutcome::NotDetected(reason) => json!({
            "detected": false,
            "reason": reason.to_string(),
        }),
    })
}

/// Region file: `--store`, else the platform cache directory, else the working directory.
fn store_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        ProjectDirs::from("id", "rumahsubsidi", "rumahsubsidi")
            .map(|dirs| dirs.cache_dir().join("region.json"))
            .unwrap_or_else(|| PathBuf::from("region.json"))
    })
}
