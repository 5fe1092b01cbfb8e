//! Fixed-size pages over date-ordered historical rates.

use chrono::NaiveDate;

use ratekeeper_common::{DailyRates, PageRequest, RateTable};

/// Sort `days` ascending and return the slice `[(page-1)*size, page*size)`.
///
/// A page past the end is empty, not an error.
pub fn paginate<I>(days: I, page: &PageRequest) -> Vec<DailyRates>
where
    I: IntoIterator<Item = (NaiveDate, RateTable)>,
{
    let mut days: Vec<(NaiveDate, RateTable)> = days.into_iter().collect();
    days.sort_by_key(|(date, _)| *date);

    let Some(offset) = page.offset() else {
        return Vec::new();
    };

    days.into_iter()
        .skip(offset)
        .take(page.page_size() as usize)
        .map(|(date, rates)| DailyRates { date, rates })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn ten_days() -> Vec<(NaiveDate, RateTable)> {
        (1..=10)
            .map(|d| {
                let mut rates = RateTable::new();
                rates.insert("USD".to_string(), Decimal::new(100 + d as i64, 2));
                (NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), rates)
            })
            .collect()
    }

    fn days_of(page: &[DailyRates]) -> Vec<u32> {
        use chrono::Datelike;
        page.iter().map(|d| d.date.day()).collect()
    }

    #[test]
    fn test_second_page() {
        let page = paginate(ten_days(), &PageRequest::new(2, 5).unwrap());
        assert_eq!(days_of(&page), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate(ten_days(), &PageRequest::new(3, 5).unwrap());
        assert!(page.is_empty());
    }

    #[test]
    fn test_partial_last_page() {
        let page = paginate(ten_days(), &PageRequest::new(4, 3).unwrap());
        assert_eq!(days_of(&page), vec![10]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut days = ten_days();
        days.reverse();
        days.swap(2, 7);
        let page = paginate(days, &PageRequest::new(1, 4).unwrap());
        assert_eq!(days_of(&page), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(ten_days(), &PageRequest::new(u32::MAX, u32::MAX).unwrap());
        assert!(page.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pages_are_bounded_and_ascending(
            total in 0usize..=10,
            page in 1u32..12,
            page_size in 1u32..12,
        ) {
            let days: Vec<_> = ten_days().into_iter().take(total).collect();
            let request = PageRequest::new(page, page_size).unwrap();
            let result = paginate(days.clone(), &request);

            prop_assert!(result.len() <= page_size as usize);
            prop_assert!(result.windows(2).all(|w| w[0].date < w[1].date));

            let start = (page as usize - 1) * page_size as usize;
            let expected = days.len().saturating_sub(start).min(page_size as usize);
            prop_assert_eq!(result.len(), expected);
        }
    }
}
