//! City name → local time, by chaining geocoding and timezone lookup.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::{StreamExt, stream};
use tracing::debug;

use crate::{
    Config,
    error::{Error, Result},
    geo::{GeoResolver, GeocoderId, normalize_query},
    model::{CityInfo, ClockEntry, GeoLocation, TimeDifference, TimeFormat, TimeInfo, WorldClock},
    timezone::TimezoneResolver,
};

#[derive(Debug, Clone)]
pub struct TimeResolver {
    geo: GeoResolver,
    timezones: TimezoneResolver,
    world_clock_limit: usize,
    concurrency: usize,
}

impl TimeResolver {
    /// `config` is expected to have passed [`Config::validate`].
    pub fn new(config: &Config, geo: GeoResolver, timezones: TimezoneResolver) -> Self {
        // Nominatim's usage policy: no parallel requests.
        let concurrency = match config.geocoder_id() {
            Ok(GeocoderId::Nominatim) => 1,
            _ => config.concurrency,
        };

        Self {
            geo,
            timezones,
            world_clock_limit: config.world_clock_limit,
            concurrency,
        }
    }

    async fn locate(&self, city: &str) -> Result<(GeoLocation, Tz)> {
        let location = self.geo.resolve(city).await?;
        let tz = self
            .timezones
            .resolve(location.latitude, location.longitude, city.trim())
            .await?;
        debug!(%city, timezone = tz.name(), "located");
        Ok((location, tz))
    }

    pub async fn current_time(&self, city: &str, format: TimeFormat) -> Result<TimeInfo> {
        self.current_time_at(city, format, Utc::now()).await
    }

    pub async fn current_time_at(
        &self,
        city: &str,
        format: TimeFormat,
        now: DateTime<Utc>,
    ) -> Result<TimeInfo> {
        let (location, tz) = self.locate(city).await?;
        Ok(time_info(&location.name, tz, now, format))
    }

    pub async fn time_difference(&self, city_a: &str, city_b: &str) -> Result<TimeDifference> {
        self.time_difference_at(city_a, city_b, Utc::now()).await
    }

    /// Both cities are evaluated at the same `now`. `city_b` is not looked up
    /// when `city_a` fails. When both names normalise to the same query the
    /// city is resolved once and the difference is zero; distinct names are
    /// always resolved independently, with nothing cached between calls.
    pub async fn time_difference_at(
        &self,
        city_a: &str,
        city_b: &str,
        now: DateTime<Utc>,
    ) -> Result<TimeDifference> {
        let a = self.current_time_at(city_a, TimeFormat::Standard, now).await?;

        if normalize_query(city_a) == normalize_query(city_b) {
            return Ok(TimeDifference::between(a.clone(), a));
        }

        let b = self.current_time_at(city_b, TimeFormat::Standard, now).await?;
        Ok(TimeDifference::between(a, b))
    }

    pub async fn world_clock(&self, cities: &[String]) -> Result<WorldClock> {
        self.world_clock_at(cities, Utc::now()).await
    }

    /// Each city resolves on its own; a failure becomes a tagged entry in
    /// place and never affects its neighbours.
    pub async fn world_clock_at(
        &self,
        cities: &[String],
        now: DateTime<Utc>,
    ) -> Result<WorldClock> {
        if cities.is_empty() {
            return Err(Error::invalid(
                "Please provide a list of cities. Example: [\"New York\", \"London\", \"Tokyo\"]",
            ));
        }

        let entries = stream::iter(cities.iter().take(self.world_clock_limit))
            .map(|city| async move {
                let label = city.trim();
                match self.current_time_at(city, TimeFormat::Standard, now).await {
                    Ok(time) => ClockEntry::Resolved {
                        city: label.to_string(),
                        time,
                    },
                    Err(e) => ClockEntry::failed(label, &e),
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(WorldClock {
            entries,
            requested: cities.len(),
        })
    }

    /// A missing or failed timezone lookup leaves `timezone_id` empty rather
    /// than failing the whole request.
    pub async fn city_info(&self, city: &str) -> Result<CityInfo> {
        let location = self.geo.resolve(city).await?;
        let timezone_id = match self
            .timezones
            .resolve(location.latitude, location.longitude, city.trim())
            .await
        {
            Ok(tz) => Some(tz.name().to_string()),
            Err(e) => {
                debug!(%city, error = %e, "no timezone for city");
                None
            }
        };
        Ok(CityInfo {
            location,
            timezone_id,
        })
    }
}

/// Snapshot of `now` in `tz`. With [`TimeFormat::Utc`] only `formatted`
/// switches to UTC; the offset stays the zone's real one.
pub fn time_info(location: &str, tz: Tz, now: DateTime<Utc>, format: TimeFormat) -> TimeInfo {
    let local = now.with_timezone(&tz);
    let fixed = local.fixed_offset();

    let formatted = match format {
        TimeFormat::Standard => local.format("%Y-%m-%d %H:%M:%S").to_string(),
        TimeFormat::Detailed => local.format("%A, %B %d, %Y at %H:%M:%S").to_string(),
        TimeFormat::Utc => now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };

    TimeInfo {
        location: location.to_string(),
        timezone_id: tz.name().to_string(),
        utc_offset_minutes: fixed.offset().local_minus_utc() / 60,
        local_timestamp: fixed,
        formatted,
        day_of_week: local.format("%A").to_string(),
        abbreviation: local.format("%Z").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGeocoder, FakeTimezones};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn resolver_with(geocoder: Arc<FakeGeocoder>) -> TimeResolver {
        TimeResolver::new(
            &Config::default(),
            GeoResolver::new(geocoder),
            TimezoneResolver::new(Arc::new(FakeTimezones::with_defaults())),
        )
    }

    fn resolver() -> TimeResolver {
        resolver_with(Arc::new(FakeGeocoder::with_defaults()))
    }

    fn summer() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn winter() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn london_offset_follows_dst() {
        let r = resolver();
        let summer_info = r
            .current_time_at("London", TimeFormat::Standard, summer())
            .await
            .unwrap();
        let winter_info = r
            .current_time_at("London", TimeFormat::Standard, winter())
            .await
            .unwrap();

        assert_eq!(summer_info.utc_offset_minutes, 60);
        assert_eq!(summer_info.abbreviation, "BST");
        assert_eq!(summer_info.formatted, "2024-07-01 13:00:00");
        assert_eq!(winter_info.utc_offset_minutes, 0);
        assert_eq!(winter_info.timezone_id, "Europe/London");
    }

    #[tokio::test]
    async fn utc_format_keeps_real_offset() {
        let info = resolver().current_time_at("London", TimeFormat::Utc, summer()).await.unwrap();
        assert_eq!(info.formatted, "2024-07-01 12:00:00 UTC");
        assert_eq!(info.utc_offset_minutes, 60);
        assert_eq!(info.local_timestamp.to_rfc3339(), "2024-07-01T13:00:00+01:00");
    }

    #[tokio::test]
    async fn detailed_format() {
        let info = resolver()
            .current_time_at("Tokyo", TimeFormat::Detailed, winter())
            .await
            .unwrap();
        assert_eq!(info.formatted, "Monday, January 15, 2024 at 21:00:00");
        assert_eq!(info.day_of_week, "Monday");
    }

    #[tokio::test]
    async fn odd_offsets_are_kept_in_minutes() {
        let info = resolver()
            .current_time_at("Kathmandu", TimeFormat::Standard, winter())
            .await
            .unwrap();
        assert_eq!(info.utc_offset_minutes, 345);
        assert_eq!(info.utc_offset_label(), "UTC+05:45");
    }

    #[tokio::test]
    async fn difference_is_a_minus_b_in_both_orders() {
        let r = resolver();

        let tl = r.time_difference_at("Tokyo", "London", summer()).await.unwrap();
        assert_eq!(tl.difference_minutes, 480);
        assert_eq!(
            tl.difference_minutes,
            tl.city_a.utc_offset_minutes - tl.city_b.utc_offset_minutes
        );

        let lt = r.time_difference_at("London", "Tokyo", summer()).await.unwrap();
        assert_eq!(lt.difference_minutes, -480);

        let winter_tl = r.time_difference_at("Tokyo", "London", winter()).await.unwrap();
        assert_eq!(winter_tl.difference_minutes, 540);
    }

    #[tokio::test]
    async fn difference_at_call_time_matches_offsets() {
        let d = resolver().time_difference("Tokyo", "London").await.unwrap();
        assert_eq!(d.difference_minutes, d.city_a.utc_offset_minutes - d.city_b.utc_offset_minutes);
        assert!(d.difference_minutes == 480 || d.difference_minutes == 540);
    }

    #[tokio::test]
    async fn same_city_is_resolved_once() {
        let geocoder = Arc::new(FakeGeocoder::with_defaults());
        let d = resolver_with(geocoder.clone())
            .time_difference_at("Paris", " paris ", summer())
            .await
            .unwrap();
        assert_eq!(d.difference_minutes, 0);
        assert_eq!(geocoder.queries().len(), 1);
    }

    #[tokio::test]
    async fn first_failure_stops_before_second_lookup() {
        let geocoder = Arc::new(FakeGeocoder::with_defaults());
        let err = resolver_with(geocoder.clone())
            .time_difference_at("Nowhereville", "London", summer())
            .await
            .unwrap_err();

        assert_eq!(err, Error::NotFound("Nowhereville".into()));
        assert_eq!(geocoder.queries(), vec!["nowhereville".to_string()]);
    }

    #[tokio::test]
    async fn second_failure_names_second_city() {
        let err = resolver()
            .time_difference_at("London", "Nowhereville", summer())
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotFound("Nowhereville".into()));
    }

    #[tokio::test]
    async fn world_clock_isolates_failures_and_keeps_order() {
        let cities: Vec<String> = ["London", "Nowhereville", "Tokyo"].map(String::from).to_vec();
        let clock = resolver().world_clock_at(&cities, summer()).await.unwrap();

        assert_eq!(clock.entries.len(), 3);
        assert_eq!(
            clock.entries.iter().map(ClockEntry::city).collect::<Vec<_>>(),
            ["London", "Nowhereville", "Tokyo"]
        );
        assert!(clock.entries[0].is_resolved());
        assert!(matches!(
            &clock.entries[1],
            ClockEntry::Failed { error: crate::error::ErrorKind::NotFound, .. }
        ));
        assert!(clock.entries[2].is_resolved());
        assert_eq!(clock.resolved_count(), 2);
        assert!(!clock.truncated());
    }

    #[tokio::test]
    async fn world_clock_tags_timezone_and_blank_failures() {
        let cities: Vec<String> = ["Point Nemo", "  ", "Sydney"].map(String::from).to_vec();
        let clock = resolver().world_clock_at(&cities, winter()).await.unwrap();

        assert!(matches!(
            &clock.entries[0],
            ClockEntry::Failed { error: crate::error::ErrorKind::TimezoneNotFound, .. }
        ));
        assert!(matches!(
            &clock.entries[1],
            ClockEntry::Failed { error: crate::error::ErrorKind::InvalidArgument, .. }
        ));
        assert!(clock.entries[2].is_resolved());
    }

    #[tokio::test]
    async fn world_clock_truncates_to_limit() {
        let config = Config {
            world_clock_limit: 2,
            ..Config::default()
        };
        let r = TimeResolver::new(
            &config,
            GeoResolver::new(Arc::new(FakeGeocoder::with_defaults())),
            TimezoneResolver::new(Arc::new(FakeTimezones::with_defaults())),
        );
        let cities: Vec<String> = ["London", "Tokyo", "Paris"].map(String::from).to_vec();
        let clock = r.world_clock_at(&cities, summer()).await.unwrap();

        assert_eq!(clock.entries.len(), 2);
        assert_eq!(clock.requested, 3);
        assert!(clock.truncated());
    }

    #[test]
    fn nominatim_lookups_are_sequential() {
        let geo = || GeoResolver::new(Arc::new(FakeGeocoder::with_defaults()));
        let tz = || TimezoneResolver::new(Arc::new(FakeTimezones::with_defaults()));

        let config = Config {
            geocoder: "nominatim".into(),
            concurrency: 8,
            ..Config::default()
        };
        assert_eq!(TimeResolver::new(&config, geo(), tz()).concurrency, 1);

        let config = Config {
            concurrency: 8,
            ..Config::default()
        };
        assert_eq!(TimeResolver::new(&config, geo(), tz()).concurrency, 8);
    }

    #[tokio::test]
    async fn empty_world_clock_is_invalid() {
        let err = resolver().world_clock(&[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn geocoder_outage_is_per_city() {
        let r = TimeResolver::new(
            &Config::default(),
            GeoResolver::new(Arc::new(FakeGeocoder::failing())),
            TimezoneResolver::new(Arc::new(FakeTimezones::with_defaults())),
        );
        let cities: Vec<String> = ["London", "Tokyo"].map(String::from).to_vec();
        let clock = r.world_clock_at(&cities, summer()).await.unwrap();
        assert!(clock.entries.iter().all(|e| matches!(
            e,
            ClockEntry::Failed { error: crate::error::ErrorKind::ServiceUnavailable, .. }
        )));
    }

    #[tokio::test]
    async fn city_info_tolerates_missing_timezone() {
        let r = resolver();
        let london = r.city_info("London").await.unwrap();
        assert_eq!(london.timezone_id.as_deref(), Some("Europe/London"));

        let nemo = r.city_info("Point Nemo").await.unwrap();
        assert_eq!(nemo.timezone_id, None);

        let err = r.city_info("Nowhereville").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
