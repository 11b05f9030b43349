use sqlparser::ast::{self, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor, TableObject, Value, ValueWithSpan};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use ulid::Ulid;

use crate::model::*;

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    InsertRoom {
        id: Ulid,
        number: Option<String>,
        rate_cents: i64,
        available: bool,
    },
    UpdateRoom {
        id: Ulid,
        // Outer None: column untouched. Inner None: set to NULL.
        number: Option<Option<String>>,
        rate_cents: Option<i64>,
        available: Option<bool>,
    },
    DeleteRoom {
        id: Ulid,
    },
    SelectRooms,
    InsertUser {
        id: Ulid,
        name: Option<String>,
        role: Role,
    },
    UpdateUserRole {
        id: Ulid,
        role: Role,
    },
    InsertBooking {
        id: Ulid,
        room_id: Ulid,
        check_in: Ms,
        check_out: Ms,
        payment_mode: Option<String>,
    },
    UpdateBookingStatus {
        id: Ulid,
        status: BookingStatus,
    },
    UpdateBooking {
        id: Ulid,
        patch: BookingPatch,
    },
    DeleteBooking {
        id: Ulid,
    },
    SelectBookings {
        id: Option<Ulid>,
        status: Option<BookingStatus>,
        room_id: Option<Ulid>,
        holder_id: Option<Ulid>,
    },
    SelectAvailability {
        room_id: Ulid,
        start: Ms,
        end: Ms,
    },
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    let dialect = PostgreSqlDialect {};
    let stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    if stmts.is_empty() {
        return Err(SqlError::Empty);
    }

    match &stmts[0] {
        Statement::Insert(insert) => parse_insert(insert),
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => parse_update(table, assignments, selection),
        Statement::Delete(delete) => parse_delete(delete),
        Statement::Query(query) => parse_select(query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    let values = extract_insert_values(insert)?;

    match table.as_str() {
        "rooms" => {
            if values.len() < 3 {
                return Err(SqlError::WrongArity("rooms", 3, values.len()));
            }
            Ok(Command::InsertRoom {
                id: parse_ulid(&values[0])?,
                number: parse_string_or_null(&values[1])?,
                rate_cents: parse_i64(&values[2])?,
                available: if values.len() >= 4 {
                    parse_bool(&values[3])?
                } else {
                    true
                },
            })
        }
        "users" => {
            if values.len() < 3 {
                return Err(SqlError::WrongArity("users", 3, values.len()));
            }
            Ok(Command::InsertUser {
                id: parse_ulid(&values[0])?,
                name: parse_string_or_null(&values[1])?,
                role: parse_role(&values[2])?,
            })
        }
        "bookings" => {
            if values.len() < 4 {
                return Err(SqlError::WrongArity("bookings", 4, values.len()));
            }
            Ok(Command::InsertBooking {
                id: parse_ulid(&values[0])?,
                room_id: parse_ulid(&values[1])?,
                check_in: parse_i64(&values[2])?,
                check_out: parse_i64(&values[3])?,
                payment_mode: if values.len() >= 5 {
                    parse_string_or_null(&values[4])?
                } else {
                    None
                },
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_update(
    table: &ast::TableWithJoins,
    assignments: &[ast::Assignment],
    selection: &Option<Expr>,
) -> Result<Command, SqlError> {
    let table = table_factor_name(&table.relation)?;
    let id = extract_where_id(selection)?;

    match table.as_str() {
        "rooms" => {
            let (mut number, mut rate_cents, mut available) = (None, None, None);
            for a in assignments {
                match assignment_column(a)?.as_str() {
                    "number" => number = Some(parse_string_or_null(&a.value)?),
                    "rate_cents" => rate_cents = Some(parse_i64(&a.value)?),
                    "available" => available = Some(parse_bool(&a.value)?),
                    col => return Err(SqlError::UnknownColumn(col.to_string())),
                }
            }
            Ok(Command::UpdateRoom { id, number, rate_cents, available })
        }
        "users" => {
            let mut role = None;
            for a in assignments {
                match assignment_column(a)?.as_str() {
                    "role" => role = Some(parse_role(&a.value)?),
                    col => return Err(SqlError::UnknownColumn(col.to_string())),
                }
            }
            let role = role.ok_or(SqlError::MissingFilter("role"))?;
            Ok(Command::UpdateUserRole { id, role })
        }
        "bookings" => {
            let mut status = None;
            let mut patch = BookingPatch::default();
            for a in assignments {
                match assignment_column(a)?.as_str() {
                    "status" => status = Some(parse_status(&a.value)?),
                    "check_in" => patch.check_in = Some(parse_i64(&a.value)?),
                    "check_out" => patch.check_out = Some(parse_i64(&a.value)?),
                    "payment_mode" => patch.payment_mode = parse_string_or_null(&a.value)?,
                    col => return Err(SqlError::UnknownColumn(col.to_string())),
                }
            }
            match status {
                Some(status) if patch.is_empty() => Ok(Command::UpdateBookingStatus { id, status }),
                Some(_) => Err(SqlError::Unsupported(
                    "status cannot be changed together with other columns".into(),
                )),
                None => Ok(Command::UpdateBooking { id, patch }),
            }
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    let id = extract_where_id(&delete.selection)?;

    match table.as_str() {
        "rooms" => Ok(Command::DeleteRoom { id }),
        "bookings" => Ok(Command::DeleteBooking { id }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };

    if select.from.is_empty() {
        return Err(SqlError::Parse("SELECT without FROM".into()));
    }
    let table = table_factor_name(&select.from[0].relation)?;

    match table.as_str() {
        "rooms" => Ok(Command::SelectRooms),
        "bookings" => {
            let mut filters = BookingFilters::default();
            if let Some(selection) = &select.selection {
                extract_booking_filters(selection, &mut filters)?;
            }
            Ok(Command::SelectBookings {
                id: filters.id,
                status: filters.status,
                room_id: filters.room_id,
                holder_id: filters.holder_id,
            })
        }
        "availability" => {
            let (mut room_id, mut start, mut end) = (None, None, None);
            if let Some(selection) = &select.selection {
                extract_availability_filters(selection, &mut room_id, &mut start, &mut end)?;
            }
            Ok(Command::SelectAvailability {
                room_id: room_id.ok_or(SqlError::MissingFilter("room_id"))?,
                start: start.ok_or(SqlError::MissingFilter("start"))?,
                end: end.ok_or(SqlError::MissingFilter("end"))?,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

#[derive(Default)]
struct BookingFilters {
    id: Option<Ulid>,
    status: Option<BookingStatus>,
    room_id: Option<Ulid>,
    holder_id: Option<Ulid>,
}

fn extract_booking_filters(expr: &Expr, filters: &mut BookingFilters) -> Result<(), SqlError> {
    if let Expr::BinaryOp { left, op, right } = expr {
        match op {
            ast::BinaryOperator::And => {
                extract_booking_filters(left, filters)?;
                extract_booking_filters(right, filters)?;
            }
            ast::BinaryOperator::Eq => match expr_column_name(left).as_deref() {
                Some("id") => filters.id = Some(parse_ulid_expr(right)?),
                Some("status") => filters.status = Some(parse_status(right)?),
                Some("room_id") => filters.room_id = Some(parse_ulid_expr(right)?),
                Some("holder_id") => filters.holder_id = Some(parse_ulid_expr(right)?),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(())
}

fn extract_availability_filters(
    expr: &Expr,
    room_id: &mut Option<Ulid>,
    start: &mut Option<Ms>,
    end: &mut Option<Ms>,
) -> Result<(), SqlError> {
    if let Expr::BinaryOp { left, op, right } = expr {
        match op {
            ast::BinaryOperator::And => {
                extract_availability_filters(left, room_id, start, end)?;
                extract_availability_filters(right, room_id, start, end)?;
            }
            ast::BinaryOperator::Eq => {
                if expr_column_name(left).as_deref() == Some("room_id") {
                    *room_id = Some(parse_ulid_expr(right)?);
                }
            }
            ast::BinaryOperator::GtEq => {
                if expr_column_name(left).as_deref() == Some("start") {
                    *start = Some(parse_i64_expr(right)?);
                }
            }
            ast::BinaryOperator::LtEq => {
                if expr_column_name(left).as_deref() == Some("end") {
                    *end = Some(parse_i64_expr(right)?);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    if let Some(first) = tables_with_joins.first() {
        table_factor_name(&first.relation)
    } else {
        Err(SqlError::Parse("DELETE without table".into()))
    }
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn assignment_column(a: &ast::Assignment) -> Result<String, SqlError> {
    match &a.target {
        ast::AssignmentTarget::ColumnName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty column name".into()))
        }
        _ => Err(SqlError::Parse("unsupported assignment target".into())),
    }
}

fn extract_insert_values(insert: &ast::Insert) -> Result<Vec<Expr>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => {
            if values.rows.is_empty() {
                return Err(SqlError::Parse("empty VALUES".into()));
            }
            if values.rows.len() > 1 {
                return Err(SqlError::Unsupported("multi-row INSERT".into()));
            }
            Ok(values.rows[0].clone())
        }
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

fn extract_where_id(selection: &Option<Expr>) -> Result<Ulid, SqlError> {
    let sel = selection.as_ref().ok_or(SqlError::MissingFilter("id"))?;
    match sel {
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } => {
            if expr_column_name(left).as_deref() == Some("id") {
                parse_ulid_expr(right)
            } else {
                Err(SqlError::MissingFilter("id"))
            }
        }
        _ => Err(SqlError::MissingFilter("id")),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

fn extract_value(expr: &Expr) -> Option<&Value> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => Some(value),
        _ => None,
    }
}

fn parse_ulid_expr(expr: &Expr) -> Result<Ulid, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) | Value::Number(s, _) => {
                Ulid::from_string(s).map_err(|e| SqlError::Parse(format!("bad ULID: {e}")))
            }
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_i64_expr(expr: &Expr) -> Result<i64, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Number(s, _) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            Value::SingleQuotedString(s) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            _ => Err(SqlError::Parse(format!("expected number, got {value:?}"))),
        }
    } else if let Expr::UnaryOp {
        op: ast::UnaryOperator::Minus,
        expr,
    } = expr
    {
        Ok(-parse_i64_expr(expr)?)
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_ulid(expr: &Expr) -> Result<Ulid, SqlError> {
    parse_ulid_expr(expr)
}

fn parse_i64(expr: &Expr) -> Result<i64, SqlError> {
    parse_i64_expr(expr)
}

fn parse_string_or_null(expr: &Expr) -> Result<Option<String>, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Null => Ok(None),
            Value::SingleQuotedString(s) => Ok(Some(s.clone())),
            _ => Err(SqlError::Parse(format!(
                "expected string or NULL, got {value:?}"
            ))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_role(expr: &Expr) -> Result<Role, SqlError> {
    let s = parse_string_or_null(expr)?
        .ok_or_else(|| SqlError::Parse("role cannot be NULL".into()))?;
    Role::parse(&s).ok_or_else(|| SqlError::Parse(format!("unknown role: {s}")))
}

fn parse_status(expr: &Expr) -> Result<BookingStatus, SqlError> {
    let s = parse_string_or_null(expr)?
        .ok_or_else(|| SqlError::Parse("status cannot be NULL".into()))?;
    BookingStatus::parse(&s).ok_or_else(|| SqlError::Parse(format!("unknown status: {s}")))
}

fn parse_bool(expr: &Expr) -> Result<bool, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::SingleQuotedString(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(SqlError::Parse(format!("bad bool: {s}"))),
            },
            Value::Number(n, _) => Ok(n != "0"),
            _ => Err(SqlError::Parse(format!("expected bool, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    UnknownColumn(String),
    WrongArity(&'static str, usize, usize),
    MissingFilter(&'static str),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::UnknownColumn(c) => write!(f, "unknown column: {c}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected {expected} values, got {got}")
            }
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
        }
    }
}

impl std::error::Error for SqlError {}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "01ARZ3NDEKTSV4RRFFQ69G5FAV";

    #[test]
    fn parse_insert_room() {
        let sql = format!("INSERT INTO rooms (id, number, rate_cents) VALUES ('{ID}', '101', 12000)");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertRoom { id, number, rate_cents, available } => {
                assert_eq!(id.to_string(), ID);
                assert_eq!(number.as_deref(), Some("101"));
                assert_eq!(rate_cents, 12000);
                assert!(available);
            }
            _ => panic!("expected InsertRoom, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_room_null_number_unavailable() {
        let sql = format!(
            "INSERT INTO rooms (id, number, rate_cents, available) VALUES ('{ID}', NULL, 5000, false)"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertRoom { number, available, .. } => {
                assert_eq!(number, None);
                assert!(!available);
            }
            _ => panic!("expected InsertRoom, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_room_partial() {
        let sql = format!("UPDATE rooms SET rate_cents = 9000 WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateRoom { number, rate_cents, available, .. } => {
                assert_eq!(number, None);
                assert_eq!(rate_cents, Some(9000));
                assert_eq!(available, None);
            }
            _ => panic!("expected UpdateRoom, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_room_null_number() {
        let sql = format!("UPDATE rooms SET number = NULL WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateRoom { number, .. } => assert_eq!(number, Some(None)),
            _ => panic!("expected UpdateRoom, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_delete_room() {
        let sql = format!("DELETE FROM rooms WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql).unwrap(), Command::DeleteRoom { .. }));
    }

    #[test]
    fn parse_insert_user() {
        let sql = format!("INSERT INTO users (id, name, role) VALUES ('{ID}', 'Ada', 'client')");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertUser { name, role, .. } => {
                assert_eq!(name.as_deref(), Some("Ada"));
                assert_eq!(role, Role::Client);
            }
            _ => panic!("expected InsertUser, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_user_role() {
        let sql = format!("UPDATE users SET role = 'admin' WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateUserRole { role, .. } => assert_eq!(role, Role::Admin),
            _ => panic!("expected UpdateUserRole, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_booking() {
        let sql = format!(
            "INSERT INTO bookings (id, room_id, check_in, check_out, payment_mode) VALUES ('{ID}', '{ID}', 1000, 2000, 'card')"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertBooking { check_in, check_out, payment_mode, .. } => {
                assert_eq!(check_in, 1000);
                assert_eq!(check_out, 2000);
                assert_eq!(payment_mode.as_deref(), Some("card"));
            }
            _ => panic!("expected InsertBooking, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_insert_booking_without_payment_mode() {
        let sql =
            format!("INSERT INTO bookings (id, room_id, check_in, check_out) VALUES ('{ID}', '{ID}', 1000, 2000)");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::InsertBooking { payment_mode, .. } => assert_eq!(payment_mode, None),
            _ => panic!("expected InsertBooking, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_booking_status() {
        let sql = format!("UPDATE bookings SET status = 'confirmed' WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateBookingStatus { status, .. } => {
                assert_eq!(status, BookingStatus::Confirmed);
            }
            _ => panic!("expected UpdateBookingStatus, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_booking_dates() {
        let sql = format!("UPDATE bookings SET check_in = 5000, check_out = 9000 WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::UpdateBooking { patch, .. } => {
                assert_eq!(patch.check_in, Some(5000));
                assert_eq!(patch.check_out, Some(9000));
                assert_eq!(patch.payment_mode, None);
            }
            _ => panic!("expected UpdateBooking, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_update_booking_status_mixed_rejected() {
        let sql =
            format!("UPDATE bookings SET status = 'confirmed', check_in = 5000 WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Err(SqlError::Unsupported(_))));
    }

    #[test]
    fn parse_update_without_where_rejected() {
        let sql = "UPDATE bookings SET status = 'confirmed'";
        assert!(matches!(parse_sql(sql), Err(SqlError::MissingFilter("id"))));
    }

    #[test]
    fn parse_select_rooms() {
        assert_eq!(parse_sql("SELECT * FROM rooms").unwrap(), Command::SelectRooms);
    }

    #[test]
    fn parse_select_bookings_filters() {
        let sql = format!("SELECT * FROM bookings WHERE room_id = '{ID}' AND status = 'pending'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectBookings { id, status, room_id, holder_id } => {
                assert_eq!(id, None);
                assert_eq!(status, Some(BookingStatus::Pending));
                assert_eq!(room_id.map(|u| u.to_string()), Some(ID.to_string()));
                assert_eq!(holder_id, None);
            }
            _ => panic!("expected SelectBookings, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_booking_by_id() {
        let sql = format!("SELECT * FROM bookings WHERE id = '{ID}'");
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectBookings { id, .. } => {
                assert_eq!(id.map(|u| u.to_string()), Some(ID.to_string()));
            }
            _ => panic!("expected SelectBookings, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_select_availability() {
        let sql = format!(
            "SELECT * FROM availability WHERE room_id = '{ID}' AND start >= 1000 AND \"end\" <= 2000"
        );
        let cmd = parse_sql(&sql).unwrap();
        match cmd {
            Command::SelectAvailability { room_id, start, end } => {
                assert_eq!(room_id.to_string(), ID);
                assert_eq!(start, 1000);
                assert_eq!(end, 2000);
            }
            _ => panic!("expected SelectAvailability, got {cmd:?}"),
        }
    }

    #[test]
    fn parse_availability_missing_window_rejected() {
        let sql = format!("SELECT * FROM availability WHERE room_id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Err(SqlError::MissingFilter(_))));
    }

    #[test]
    fn parse_unknown_table_errors() {
        let sql = format!("INSERT INTO foobar (id) VALUES ('{ID}')");
        assert!(matches!(parse_sql(&sql), Err(SqlError::UnknownTable(_))));
    }

    #[test]
    fn parse_unknown_column_errors() {
        let sql = format!("UPDATE rooms SET colour = 'red' WHERE id = '{ID}'");
        assert!(matches!(parse_sql(&sql), Err(SqlError::UnknownColumn(_))));
    }

    #[test]
    fn parse_multi_row_insert_rejected() {
        let sql = format!(
            "INSERT INTO bookings (id, room_id, check_in, check_out) VALUES ('{ID}', '{ID}', 1000, 2000), ('{ID}', '{ID}', 3000, 4000)"
        );
        assert!(matches!(parse_sql(&sql), Err(SqlError::Unsupported(_))));
    }

    #[test]
    fn parse_empty_errors() {
        assert!(matches!(parse_sql(""), Err(SqlError::Empty)));
    }
}
