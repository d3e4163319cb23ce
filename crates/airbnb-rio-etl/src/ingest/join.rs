//! Inner join of listings and reviews.

use crate::error::{EtlError, Result, ResultExt};
use crate::utils::has_column;
use polars::prelude::*;
use tracing::{debug, info};

const LISTING_ROW: &str = "__listing_row";
const REVIEW_ROW: &str = "__review_row";

/// Inner join `listings` and `reviews` on `key`.
///
/// Only keys present in both tables survive. Every column of both inputs is
/// kept; a non-key review column whose name collides with a listing column
/// gets `suffix` appended. Rows come out in listing order, with multiple
/// review matches for one listing in review order.
pub fn join_on_key(
    listings: &DataFrame,
    reviews: &DataFrame,
    key: &str,
    suffix: &str,
) -> Result<DataFrame> {
    for (table, df) in [("listings", listings), ("reviews", reviews)] {
        if !has_column(df, key) {
            return Err(EtlError::MissingKeyColumn {
                table: table.to_string(),
                column: key.to_string(),
            });
        }
    }

    let left = listings.with_row_index(LISTING_ROW.into(), None)?;
    let right = reviews.with_row_index(REVIEW_ROW.into(), None)?;

    let joined = left
        .lazy()
        .join(
            right.lazy(),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner).with_suffix(Some(suffix.into())),
        )
        .collect()
        .context(format!("Failed to join on '{}'", key))?;

    let joined = joined
        .sort([LISTING_ROW, REVIEW_ROW], SortMultipleOptions::default())?
        .drop_many([LISTING_ROW, REVIEW_ROW]);

    debug!(
        "Join on '{}': {} listings x {} reviews -> {} rows",
        key,
        listings.height(),
        reviews.height(),
        joined.height()
    );
    info!("Joined table: {:?}", joined.shape());

    Ok(joined)
}
