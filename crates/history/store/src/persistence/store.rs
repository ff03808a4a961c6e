mod error;

pub use self::error::StoreError;

use chrono::{DateTime, Utc};
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, dsl, result::OptionalExtension};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::{
    record::{
        insert::{NewConfirmationRecord, NewTxRecord},
        select::{ConfirmationRecord, TxRecord},
    },
    schema,
};

use self::error::Result;

pub async fn save_new_tx_if_absent(
    conn: &mut AsyncPgConnection,
    new_tx: NewTxRecord<'_>,
) -> Result<bool> {
    let affected = diesel::insert_into(schema::multisig_tx::table)
        .values(new_tx)
        .on_conflict((schema::multisig_tx::safe_address, schema::multisig_tx::contract_tx_hash))
        .do_nothing()
        .execute(conn)
        .await?;

    assert!(affected <= 1, "single-row insert must not affect multiple rows");

    Ok(affected == 1)
}

pub async fn save_new_confirmation_if_absent(
    conn: &mut AsyncPgConnection,
    new_confirmation: NewConfirmationRecord<'_>,
) -> Result<bool> {
    let affected = diesel::insert_into(schema::confirmation::table)
        .values(new_confirmation)
        .on_conflict((
            schema::confirmation::safe_address,
            schema::confirmation::contract_tx_hash,
            schema::confirmation::dedup_key,
        ))
        .do_nothing()
        .execute(conn)
        .await?;

    assert!(affected <= 1, "single-row insert must not affect multiple rows");

    Ok(affected == 1)
}

pub async fn fetch_tx_by_safe_and_hash(
    conn: &mut AsyncPgConnection,
    safe_address: &str,
    contract_tx_hash: &str,
) -> Result<Option<TxRecord>> {
    schema::multisig_tx::table
        .filter(schema::multisig_tx::safe_address.eq(safe_address))
        .filter(schema::multisig_tx::contract_tx_hash.eq(contract_tx_hash))
        .first(conn)
        .await
        .optional()
        .map_err(From::from)
}

pub async fn count_txs_by_safe(
    conn: &mut AsyncPgConnection,
    safe_address: &str,
    owner_filter: Option<&[String]>,
) -> Result<i64> {
    let mut query = schema::multisig_tx::table
        .filter(schema::multisig_tx::safe_address.eq(safe_address))
        .into_boxed();

    if let Some(owners) = owner_filter {
        query = query.filter(dsl::exists(
            schema::confirmation::table
                .filter(schema::confirmation::safe_address.eq(schema::multisig_tx::safe_address))
                .filter(
                    schema::confirmation::contract_tx_hash
                        .eq(schema::multisig_tx::contract_tx_hash),
                )
                .filter(schema::confirmation::owner_address.eq_any(owners)),
        ));
    }

    query.count().get_result(conn).await.map_err(From::from)
}

/// Fetches one page of transactions, newest first.
///
/// The page boundary is keyset-based on `(created_at, id)`, both immutable
/// after insert, so concurrent writes never shift rows across an already
/// consumed boundary.
pub async fn fetch_tx_page_by_safe(
    conn: &mut AsyncPgConnection,
    safe_address: &str,
    owner_filter: Option<&[String]>,
    after: Option<(DateTime<Utc>, Uuid)>,
    limit: i64,
) -> Result<Vec<TxRecord>> {
    let mut query = schema::multisig_tx::table
        .filter(schema::multisig_tx::safe_address.eq(safe_address))
        .into_boxed();

    if let Some(owners) = owner_filter {
        query = query.filter(dsl::exists(
            schema::confirmation::table
                .filter(schema::confirmation::safe_address.eq(schema::multisig_tx::safe_address))
                .filter(
                    schema::confirmation::contract_tx_hash
                        .eq(schema::multisig_tx::contract_tx_hash),
                )
                .filter(schema::confirmation::owner_address.eq_any(owners)),
        ));
    }

    if let Some((created_at, id)) = after {
        query = query.filter(
            schema::multisig_tx::created_at.lt(created_at).or(schema::multisig_tx::created_at
                .eq(created_at)
                .and(schema::multisig_tx::id.lt(id))),
        );
    }

    query
        .order((schema::multisig_tx::created_at.desc(), schema::multisig_tx::id.desc()))
        .limit(limit)
        .load(conn)
        .await
        .map_err(From::from)
}

pub async fn fetch_confirmations_by_tx_hashes(
    conn: &mut AsyncPgConnection,
    safe_address: &str,
    contract_tx_hashes: &[String],
) -> Result<Vec<ConfirmationRecord>> {
    schema::confirmation::table
        .filter(schema::confirmation::safe_address.eq(safe_address))
        .filter(schema::confirmation::contract_tx_hash.eq_any(contract_tx_hashes))
        .order((
            schema::confirmation::block_date_time.desc(),
            schema::confirmation::created_at.asc(),
        ))
        .load(conn)
        .await
        .map_err(From::from)
}
