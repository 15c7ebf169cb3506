use crate::token::TokenKind;
use madlad_core::ops::BinaryOp;

/// Binding power of a binary operator token, 0 for anything else
pub fn get_precedence(kind: &TokenKind) -> i32 {
    match kind {
        TokenKind::Or => 60,
        TokenKind::And => 80,
        TokenKind::DoubleEqual
        | TokenKind::ExclamationEqual
        | TokenKind::GreaterThan
        | TokenKind::LessThan
        | TokenKind::GreaterThanEqual
        | TokenKind::LessThanEqual => 100,
        TokenKind::Plus | TokenKind::Minus => 200,
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => 300,
        _ => 0,
    }
}

/// `true` for left-associative operators; every binary operator is
pub fn get_associativity(_kind: &TokenKind) -> bool {
    true
}

pub fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::DoubleEqual => BinaryOp::Eq,
        TokenKind::ExclamationEqual => BinaryOp::Ne,
        TokenKind::LessThan => BinaryOp::Lt,
        TokenKind::LessThanEqual => BinaryOp::Le,
        TokenKind::GreaterThan => BinaryOp::Gt,
        TokenKind::GreaterThanEqual => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Asterisk => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}

/// `o12` names catalog operator 12
pub fn operator_id(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('o')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_id_names() {
        assert_eq!(operator_id("o2"), Some(2));
        assert_eq!(operator_id("o40"), Some(40));
        assert_eq!(operator_id("o"), None);
        assert_eq!(operator_id("one"), None);
        assert_eq!(operator_id("wrap"), None);
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert!(get_precedence(&TokenKind::Asterisk) > get_precedence(&TokenKind::Plus));
        assert!(get_precedence(&TokenKind::Plus) > get_precedence(&TokenKind::LessThan));
        assert!(get_precedence(&TokenKind::And) > get_precedence(&TokenKind::Or));
        assert_eq!(get_precedence(&TokenKind::Comma), 0);
    }
}
