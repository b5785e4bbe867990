//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations:
//! - **Average Compensation by Location**: one bar per location in the working set
//! - **Employee Count by Experience Range**: one bar per experience bucket, or
//!   grouped bars per location or role
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::dashboard::{
    aggregation::{ExperienceBucket, LocationMean},
    filters::Breakdown,
    pipeline::ExperienceBreakdown,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML container for a dashboard chart.
pub(super) fn chart_container(chart: &DashboardChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="min-h-[380px] w-full rounded dark:bg-gray-100"
        {}
    )
}

/// Generates the inline script that initializes `charts`.
///
/// The script runs as soon as it is parsed, so it must come after the chart
/// containers. htmx runs inline scripts in swapped content, so the same
/// script works for the full page and for partial updates.
pub(super) fn charts_script(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom || typeof echarts === 'undefined') {{
                        return;
                    }}
                    const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option, true);

                    window.addEventListener('resize', () => chart.resize());

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                escape_script_text(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        script { (PreEscaped(script_content)) }
    )
}

/// Stops text such as a location name from closing the surrounding `<script>`.
///
/// `</` and `<!--` only appear inside string literals in the chart options,
/// where `<\/` and `<\!--` read back as the same text.
fn escape_script_text(options: &str) -> String {
    options.replace("</", "<\\/").replace("<!--", "<\\!--")
}

pub(super) fn location_compensation_chart(location_means: &[LocationMean]) -> Chart {
    let labels: Vec<String> = location_means
        .iter()
        .map(|location_mean| location_mean.location.clone())
        .collect();
    let values: Vec<Option<f64>> = location_means
        .iter()
        .map(|location_mean| location_mean.mean)
        .collect();

    Chart::new()
        .title(Title::new().text("Average Compensation by Location"))
        .tooltip(axis_tooltip().value_formatter(inr_formatter()))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("Compensation")
                .axis_label(AxisLabel::new().formatter(inr_formatter())),
        )
        .series(Bar::new().name("Compensation").data(values))
}

pub(super) fn experience_chart(experience: &ExperienceBreakdown) -> Chart {
    let labels: Vec<String> = ExperienceBucket::ALL
        .iter()
        .map(|bucket| bucket.label().to_owned())
        .collect();

    let title = match experience {
        ExperienceBreakdown::Total(_) => "Employee Count by Experience Range".to_owned(),
        ExperienceBreakdown::Grouped { dimension, .. } => format!(
            "Employee Count by Experience Range and {}",
            dimension.label()
        ),
    };

    let chart = Chart::new()
        .title(Title::new().text(title))
        .tooltip(axis_tooltip())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name("Experience (years)")
                .data(labels),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name("Count"));

    match experience {
        ExperienceBreakdown::Total(counts) => chart
            .grid(default_grid())
            .series(Bar::new().name("Count").data(counts_to_data(counts))),
        ExperienceBreakdown::Grouped { series, .. } => {
            let mut chart = chart
                .legend(Legend::new().top(30))
                .grid(default_grid().top(80));

            for group in series {
                chart = chart.series(
                    Bar::new()
                        .name(group.name.as_str())
                        .data(counts_to_data(&group.counts)),
                );
            }

            chart
        }
    }
}

/// The id of the chart container for a breakdown, so that switching the
/// breakdown replaces the chart instead of merging series into it.
pub(super) fn experience_chart_id(breakdown: Breakdown) -> &'static str {
    match breakdown {
        Breakdown::None => "experience-chart",
        Breakdown::Location => "experience-by-location-chart",
        Breakdown::Role => "experience-by-role-chart",
    }
}

fn counts_to_data(counts: &[usize]) -> Vec<f64> {
    counts.iter().map(|&count| count as f64).collect()
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn axis_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[inline]
fn inr_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const inrFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'INR',
              currencyDisplay: 'code'
            });
            return (number || number === 0) ? inrFormatter.format(number) : \"-\";",
    )
}

#[cfg(test)]
mod tests {
    use crate::dashboard::{
        aggregation::{ExperienceSeries, LocationMean},
        filters::Breakdown,
        pipeline::ExperienceBreakdown,
    };

    use super::{DashboardChart, charts_script, experience_chart, location_compensation_chart};

    #[test]
    fn location_chart_has_one_bar_per_location() {
        let chart = location_compensation_chart(&[
            LocationMean {
                location: "LA".to_owned(),
                mean: Some(150_000.0),
            },
            LocationMean {
                location: "NY".to_owned(),
                mean: None,
            },
        ]);

        let options = chart.to_string();

        assert!(options.contains("Average Compensation by Location"));
        assert!(options.contains("\"LA\""));
        assert!(options.contains("\"NY\""));
        assert!(options.contains("150000"));
    }

    #[test]
    fn experience_chart_lists_every_bucket() {
        let chart = experience_chart(&ExperienceBreakdown::Total([1, 1, 0, 0, 0, 0]));

        let options = chart.to_string();

        for label in ["0-1", "1-2", "2-5", "5-10", "10-20", "20+"] {
            assert!(options.contains(&format!("\"{label}\"")), "missing {label}");
        }
        assert!(options.contains("Employee Count by Experience Range"));
    }

    #[test]
    fn grouped_experience_chart_has_series_per_group() {
        let chart = experience_chart(&ExperienceBreakdown::Grouped {
            dimension: Breakdown::Role,
            series: vec![
                ExperienceSeries {
                    name: "Eng".to_owned(),
                    counts: [1, 1, 0, 0, 0, 0],
                },
                ExperienceSeries {
                    name: "Sales".to_owned(),
                    counts: [0, 0, 1, 0, 0, 0],
                },
            ],
        });

        let options = chart.to_string();

        assert!(options.contains("Employee Count by Experience Range and Role"));
        assert!(options.contains("\"Eng\""));
        assert!(options.contains("\"Sales\""));
    }

    #[test]
    fn script_initializes_each_chart() {
        let charts = [
            DashboardChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            DashboardChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let script = charts_script(&charts).into_string();

        assert!(script.starts_with("<script>"));
        assert!(script.contains("document.getElementById(\"first-chart\")"));
        assert!(script.contains("document.getElementById(\"second-chart\")"));
    }

    #[test]
    fn location_names_cannot_close_the_script() {
        let chart = location_compensation_chart(&[LocationMean {
            location: "</script><script>alert(1)</script><!--".to_owned(),
            mean: Some(100_000.0),
        }]);
        let charts = [DashboardChart {
            id: "location-chart",
            options: chart.to_string(),
        }];

        let script = charts_script(&charts).into_string();

        assert_eq!(script.matches("</script").count(), 1);
        assert!(script.ends_with("</script>"));
        assert!(!script.contains("<!--"));
        assert!(script.contains(r"<\/script><script>alert(1)<\/script><\!--"));
    }
}
