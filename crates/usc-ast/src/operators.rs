//! Operator enumerations and their target-language tokens.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    Equality,
    Inequality,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// `and` in the source language.
    LogicalAnd,
    /// `or` in the source language.
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    ExclusiveOr,
    ShiftLeft,
    ShiftRight,
    Assign,
    InPlaceAdd,
    InPlaceSubtract,
    InPlaceMultiply,
    InPlaceDivide,
    InPlaceModulus,
    InPlaceBitwiseAnd,
    InPlaceBitwiseOr,
    InPlaceExclusiveOr,
    InPlaceShiftLeft,
    InPlaceShiftRight,
}

/// Binding strength, higher binds tighter.
pub mod precedence {
    pub const ASSIGNMENT: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const LOGICAL_OR: u8 = 3;
    pub const LOGICAL_AND: u8 = 4;
    pub const BITWISE_OR: u8 = 5;
    pub const EXCLUSIVE_OR: u8 = 6;
    pub const BITWISE_AND: u8 = 7;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const UNARY: u8 = 13;
    pub const PRIMARY: u8 = 14;
}

impl BinaryOperator {
    /// Target-language token.
    pub fn token(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulus => "%",
            Equality => "==",
            Inequality => "!=",
            LessThan => "<",
            LessThanOrEqual => "<=",
            GreaterThan => ">",
            GreaterThanOrEqual => ">=",
            LogicalAnd => "&&",
            LogicalOr => "||",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            ExclusiveOr => "^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Assign => "=",
            InPlaceAdd => "+=",
            InPlaceSubtract => "-=",
            InPlaceMultiply => "*=",
            InPlaceDivide => "/=",
            InPlaceModulus => "%=",
            InPlaceBitwiseAnd => "&=",
            InPlaceBitwiseOr => "|=",
            InPlaceExclusiveOr => "^=",
            InPlaceShiftLeft => "<<=",
            InPlaceShiftRight => ">>=",
        }
    }

    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            Multiply | Divide | Modulus => precedence::MULTIPLICATIVE,
            Add | Subtract => precedence::ADDITIVE,
            ShiftLeft | ShiftRight => precedence::SHIFT,
            LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => precedence::RELATIONAL,
            Equality | Inequality => precedence::EQUALITY,
            BitwiseAnd => precedence::BITWISE_AND,
            ExclusiveOr => precedence::EXCLUSIVE_OR,
            BitwiseOr => precedence::BITWISE_OR,
            LogicalAnd => precedence::LOGICAL_AND,
            LogicalOr => precedence::LOGICAL_OR,
            _ => precedence::ASSIGNMENT,
        }
    }

    pub fn is_assignment(self) -> bool {
        self.precedence() == precedence::ASSIGNMENT
    }

    /// `==` or `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Equality | BinaryOperator::Inequality)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self.precedence(),
            precedence::EQUALITY | precedence::RELATIONAL
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr)
    }

    /// Assignment operators associate to the right.
    pub fn is_right_associative(self) -> bool {
        self.is_assignment()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `not` in the source language.
    LogicalNot,
    UnaryNegation,
    UnaryPlus,
    OnesComplement,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOperator {
    pub fn token(self) -> &'static str {
        match self {
            UnaryOperator::LogicalNot => "!",
            UnaryOperator::UnaryNegation => "-",
            UnaryOperator::UnaryPlus => "+",
            UnaryOperator::OnesComplement => "~",
            UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
            UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(
            self,
            UnaryOperator::PostIncrement | UnaryOperator::PostDecrement
        )
    }

    pub fn precedence(self) -> u8 {
        if self.is_postfix() {
            precedence::PRIMARY
        } else {
            precedence::UNARY
        }
    }

    /// Operators that write their operand.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            UnaryOperator::PreIncrement
                | UnaryOperator::PreDecrement
                | UnaryOperator::PostIncrement
                | UnaryOperator::PostDecrement
        )
    }
}
