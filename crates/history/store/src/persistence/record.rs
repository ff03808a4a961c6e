pub mod insert;
pub mod select;

use core::str::FromStr;

use std::io::Write;

use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::Pg,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
};
use safe_history_domain::{confirmation::ConfirmationKind, tx::SafeOperation};

#[derive(Debug, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct Operation(SafeOperation);

#[derive(Debug, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct EvidenceKind(ConfirmationKind);

impl Operation {
    pub fn into_inner(self) -> SafeOperation {
        self.0
    }
}

impl EvidenceKind {
    pub fn into_inner(self) -> ConfirmationKind {
        self.0
    }
}

impl From<SafeOperation> for Operation {
    fn from(operation: SafeOperation) -> Self {
        Self(operation)
    }
}

impl From<ConfirmationKind> for EvidenceKind {
    fn from(kind: ConfirmationKind) -> Self {
        Self(kind)
    }
}

impl ToSql<Text, Pg> for Operation {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(<&str>::from(&self.0).as_bytes())?;

        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Operation {
    fn from_sql(bz: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        str::from_utf8(bz.as_bytes())
            .map(FromStr::from_str)?
            .map(Self)
            .map_err(From::from)
    }
}

impl ToSql<Text, Pg> for EvidenceKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(<&str>::from(&self.0).as_bytes())?;

        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EvidenceKind {
    fn from_sql(bz: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        str::from_utf8(bz.as_bytes())
            .map(FromStr::from_str)?
            .map(Self)
            .map_err(From::from)
    }
}
