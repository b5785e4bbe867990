//! Grouping and averaging of employees for the dashboard metrics and charts.

use std::collections::BTreeMap;

use crate::employee::Employee;

/// The arithmetic mean of the known compensations, skipping missing ones.
///
/// Returns `None` if no employee has a known compensation.
pub(super) fn mean_compensation<'a>(employees: impl IntoIterator<Item = &'a Employee>) -> Option<f64> {
    let (sum, count) = employees
        .into_iter()
        .filter_map(|employee| employee.compensation)
        .fold((0.0, 0usize), |(sum, count), compensation| {
            (sum + compensation, count + 1)
        });

    (count > 0).then(|| sum / count as f64)
}

/// The mean compensation of the employees at one location.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LocationMean {
    pub location: String,
    /// `None` when nobody at the location has a known compensation.
    pub mean: Option<f64>,
}

/// Mean compensation per location, sorted by location.
///
/// Employees with no location are left out.
pub(super) fn mean_compensation_by_location(employees: &[Employee]) -> Vec<LocationMean> {
    let mut by_location: BTreeMap<&str, Vec<&Employee>> = BTreeMap::new();

    for employee in employees {
        if let Some(location) = employee.location.as_deref() {
            by_location.entry(location).or_default().push(employee);
        }
    }

    by_location
        .into_iter()
        .map(|(location, employees)| LocationMean {
            location: location.to_owned(),
            mean: mean_compensation(employees),
        })
        .collect()
}

/// A half-open range of years of experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum ExperienceBucket {
    /// [0, 1)
    UnderOne,
    /// [1, 2)
    OneToTwo,
    /// [2, 5)
    TwoToFive,
    /// [5, 10)
    FiveToTen,
    /// [10, 20)
    TenToTwenty,
    /// [20, ∞)
    TwentyPlus,
}

pub(super) const BUCKET_COUNT: usize = 6;

/// Employee counts indexed by [ExperienceBucket::index].
pub(super) type BucketCounts = [usize; BUCKET_COUNT];

impl ExperienceBucket {
    /// All buckets in ascending order.
    pub const ALL: [ExperienceBucket; BUCKET_COUNT] = [
        ExperienceBucket::UnderOne,
        ExperienceBucket::OneToTwo,
        ExperienceBucket::TwoToFive,
        ExperienceBucket::FiveToTen,
        ExperienceBucket::TenToTwenty,
        ExperienceBucket::TwentyPlus,
    ];

    /// The bucket that contains `years`, or `None` for negative or
    /// non-finite values.
    pub fn from_years(years: f64) -> Option<Self> {
        if !years.is_finite() || years < 0.0 {
            return None;
        }

        let bucket = if years < 1.0 {
            ExperienceBucket::UnderOne
        } else if years < 2.0 {
            ExperienceBucket::OneToTwo
        } else if years < 5.0 {
            ExperienceBucket::TwoToFive
        } else if years < 10.0 {
            ExperienceBucket::FiveToTen
        } else if years < 20.0 {
            ExperienceBucket::TenToTwenty
        } else {
            ExperienceBucket::TwentyPlus
        };

        Some(bucket)
    }

    pub fn label(self) -> &'static str {
        match self {
            ExperienceBucket::UnderOne => "0-1",
            ExperienceBucket::OneToTwo => "1-2",
            ExperienceBucket::TwoToFive => "2-5",
            ExperienceBucket::FiveToTen => "5-10",
            ExperienceBucket::TenToTwenty => "10-20",
            ExperienceBucket::TwentyPlus => "20+",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Count employees per experience bucket. Employees with unknown experience
/// are not counted.
pub(super) fn count_by_experience<'a>(
    employees: impl IntoIterator<Item = &'a Employee>,
) -> BucketCounts {
    let mut counts = [0; BUCKET_COUNT];

    for bucket in employees
        .into_iter()
        .filter_map(|employee| employee.experience_years)
        .filter_map(ExperienceBucket::from_years)
    {
        counts[bucket.index()] += 1;
    }

    counts
}

/// One bar series of a grouped experience chart.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExperienceSeries {
    /// The location or role this series counts.
    pub name: String,
    pub counts: BucketCounts,
}

/// Count employees per experience bucket, split by the value `key` returns.
///
/// Series are sorted by name. Employees for which `key` returns `None` are
/// left out, as are series with no employees in any bucket.
pub(super) fn count_by_experience_grouped(
    employees: &[Employee],
    key: impl Fn(&Employee) -> Option<&str>,
) -> Vec<ExperienceSeries> {
    let mut groups: BTreeMap<&str, Vec<&Employee>> = BTreeMap::new();

    for employee in employees {
        if let Some(name) = key(employee) {
            groups.entry(name).or_default().push(employee);
        }
    }

    groups
        .into_iter()
        .map(|(name, employees)| ExperienceSeries {
            name: name.to_owned(),
            counts: count_by_experience(employees),
        })
        .filter(|series| series.counts.iter().any(|&count| count > 0))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::employee::{Employee, Status};

    use super::{
        ExperienceBucket, ExperienceSeries, LocationMean, count_by_experience,
        count_by_experience_grouped, mean_compensation, mean_compensation_by_location,
    };

    fn employee(
        role: &str,
        location: &str,
        experience_years: Option<f64>,
        compensation: Option<f64>,
    ) -> Employee {
        Employee {
            name: "Test".to_owned(),
            role: Some(role.to_owned()),
            location: Some(location.to_owned()),
            experience_years,
            compensation,
            status: Status::Active,
        }
    }

    #[test]
    fn mean_skips_missing_compensation() {
        let employees = [
            employee("Eng", "NY", None, Some(100_000.0)),
            employee("Eng", "NY", None, None),
            employee("Eng", "NY", None, Some(200_000.0)),
        ];

        assert_eq!(mean_compensation(&employees), Some(150_000.0));
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean_compensation(&[] as &[Employee]), None);
        assert_eq!(
            mean_compensation(&[employee("Eng", "NY", None, None)]),
            None
        );
    }

    #[test]
    fn groups_means_by_location() {
        let mut no_location = employee("Eng", "", None, Some(1.0));
        no_location.location = None;
        let employees = [
            employee("Eng", "NY", None, Some(100_000.0)),
            employee("Sales", "LA", None, Some(150_000.0)),
            employee("Eng", "NY", None, Some(200_000.0)),
            employee("Eng", "Pune", None, None),
            no_location,
        ];

        assert_eq!(
            mean_compensation_by_location(&employees),
            vec![
                LocationMean {
                    location: "LA".to_owned(),
                    mean: Some(150_000.0)
                },
                LocationMean {
                    location: "NY".to_owned(),
                    mean: Some(150_000.0)
                },
                LocationMean {
                    location: "Pune".to_owned(),
                    mean: None
                },
            ]
        );
    }

    #[test]
    fn buckets_are_half_open() {
        let cases = [
            (0.0, ExperienceBucket::UnderOne),
            (0.99, ExperienceBucket::UnderOne),
            (1.0, ExperienceBucket::OneToTwo),
            (1.99, ExperienceBucket::OneToTwo),
            (2.0, ExperienceBucket::TwoToFive),
            (4.9, ExperienceBucket::TwoToFive),
            (5.0, ExperienceBucket::FiveToTen),
            (10.0, ExperienceBucket::TenToTwenty),
            (19.99, ExperienceBucket::TenToTwenty),
            (20.0, ExperienceBucket::TwentyPlus),
            (45.0, ExperienceBucket::TwentyPlus),
        ];

        for (years, want) in cases {
            assert_eq!(ExperienceBucket::from_years(years), Some(want), "{years}");
        }

        assert_eq!(ExperienceBucket::from_years(-0.5), None);
        assert_eq!(ExperienceBucket::from_years(f64::NAN), None);
    }

    #[test]
    fn counts_skip_unknown_experience() {
        let employees = [
            employee("Eng", "NY", Some(0.5), None),
            employee("Eng", "NY", Some(1.5), None),
            employee("Eng", "NY", None, None),
            employee("Eng", "NY", Some(25.0), None),
        ];

        assert_eq!(count_by_experience(&employees), [1, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn grouped_counts_are_sorted_by_name() {
        let employees = [
            employee("Sales", "LA", Some(3.0), None),
            employee("Eng", "NY", Some(0.5), None),
            employee("Eng", "NY", Some(1.5), None),
            employee("Ops", "NY", None, None),
        ];

        let by_role = count_by_experience_grouped(&employees, |employee| employee.role.as_deref());

        assert_eq!(
            by_role,
            vec![
                ExperienceSeries {
                    name: "Eng".to_owned(),
                    counts: [1, 1, 0, 0, 0, 0]
                },
                ExperienceSeries {
                    name: "Sales".to_owned(),
                    counts: [0, 0, 1, 0, 0, 0]
                },
            ]
        );
    }
}
