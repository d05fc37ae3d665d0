//! Data source identifiers.
//!
//! One KPI source, one source per chart, and the paginated shortlist. Each
//! is fetched, cached and failed independently.

use std::fmt;

/// Sources served by `GET /charts/<endpoint>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartSource {
    Kpis,
    PropertyClassMix,
    CountByCounty,
    AverageValueByCounty,
    DaysSincePetition,
    DaysDeathToPetition,
    PetitionTypes,
    Parties,
    FilingsByMonth,
    FilingsByMonthTiered,
    AbsenteeRateTrend,
    ValueHist,
}

impl ChartSource {
    pub const ALL: [ChartSource; 12] = [
        ChartSource::Kpis,
        ChartSource::PropertyClassMix,
        ChartSource::CountByCounty,
        ChartSource::AverageValueByCounty,
        ChartSource::DaysSincePetition,
        ChartSource::DaysDeathToPetition,
        ChartSource::PetitionTypes,
        ChartSource::Parties,
        ChartSource::FilingsByMonth,
        ChartSource::FilingsByMonthTiered,
        ChartSource::AbsenteeRateTrend,
        ChartSource::ValueHist,
    ];

    /// Path segment under `/charts/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            ChartSource::Kpis => "kpis",
            ChartSource::PropertyClassMix => "property-class-mix",
            ChartSource::CountByCounty => "count-by-county",
            ChartSource::AverageValueByCounty => "average-value-by-county",
            ChartSource::DaysSincePetition => "binned-days-since-petition",
            ChartSource::DaysDeathToPetition => "binned-days-petition-to-death",
            ChartSource::PetitionTypes => "petition-types",
            ChartSource::Parties => "get-parties",
            ChartSource::FilingsByMonth => "filings-by-month",
            ChartSource::FilingsByMonthTiered => "filings-by-month-tiered",
            ChartSource::AbsenteeRateTrend => "absentee-rate-trend",
            ChartSource::ValueHist => "value-hist",
        }
    }

    /// Top-level key holding the series in the raw payload
    pub fn response_key(&self) -> &'static str {
        match self {
            ChartSource::Kpis => "kpis",
            ChartSource::PropertyClassMix => "propertyClassMix",
            ChartSource::CountByCounty => "countByCounty",
            ChartSource::AverageValueByCounty => "averageValueByCounty",
            ChartSource::DaysSincePetition => "daysSincePetitionHist",
            ChartSource::DaysDeathToPetition => "daysDeathToPetitionHist",
            ChartSource::PetitionTypes => "petitionTypes",
            ChartSource::Parties => "parties",
            ChartSource::FilingsByMonth => "filingsByMonth",
            ChartSource::FilingsByMonthTiered => "filingsByMonthTiered",
            ChartSource::AbsenteeRateTrend => "absenteeRateTrend",
            ChartSource::ValueHist => "valueHist",
        }
    }

    pub fn from_endpoint(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.endpoint() == name)
    }

    /// Title shown above the chart
    pub fn title(&self) -> &'static str {
        match self {
            ChartSource::Kpis => "Headline Metrics",
            ChartSource::PropertyClassMix => "Property Class Mix",
            ChartSource::CountByCounty => "Absentee vs Local by County",
            // Backend supplies an average; the title is a presentation choice.
            ChartSource::AverageValueByCounty => "Median Value by County",
            ChartSource::DaysSincePetition => "Days Since Petition",
            ChartSource::DaysDeathToPetition => "Death → Petition Delay (days)",
            ChartSource::PetitionTypes => "Petition Types",
            ChartSource::Parties => "Top Parties by Holdings",
            ChartSource::FilingsByMonth => "Filings by Month",
            ChartSource::FilingsByMonthTiered => "Lead Tiers Over Time",
            ChartSource::AbsenteeRateTrend => "Absentee Rate Trend",
            ChartSource::ValueHist => "Property Value Distribution",
        }
    }
}

impl fmt::Display for ChartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Any independently dispatched source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Chart(ChartSource),
    Shortlist,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Chart(source) => write!(f, "charts/{source}"),
            SourceId::Shortlist => f.write_str("shortlist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_unique() {
        for source in ChartSource::ALL {
            assert_eq!(ChartSource::from_endpoint(source.endpoint()), Some(source));
        }
    }

    #[test]
    fn test_source_id_display() {
        assert_eq!(SourceId::Chart(ChartSource::Parties).to_string(), "charts/get-parties");
        assert_eq!(SourceId::Shortlist.to_string(), "shortlist");
    }
}
