/// The canonical columns a bank export is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Date,
    Description,
    Income,
    Expense,
    Amount,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Amount => "amount",
        }
    }
}

/// Known header spellings, Portuguese (BR), English and Spanish exports.
/// Compared after lowercasing and trimming.
const SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Date,
        &[
            "data",
            "data lançamento",
            "data lancamento",
            "data de lançamento",
            "data de compra",
            "date",
            "transaction date",
            "posting date",
            "posted date",
            "fecha",
        ],
    ),
    (
        CanonicalField::Description,
        &[
            "descrição",
            "descricao",
            "histórico",
            "historico",
            "lançamento",
            "description",
            "memo",
            "payee",
            "details",
            "descripción",
            "concepto",
        ],
    ),
    (
        CanonicalField::Income,
        &[
            "entrada",
            "entradas",
            "crédito",
            "credito",
            "income",
            "credit",
            "deposit",
            "deposits",
            "ingreso",
        ],
    ),
    (
        CanonicalField::Expense,
        &[
            "saída",
            "saida",
            "saídas",
            "saidas",
            "débito",
            "debito",
            "expense",
            "debit",
            "withdrawal",
            "withdrawals",
            "gasto",
        ],
    ),
    (
        CanonicalField::Amount,
        &[
            "valor",
            "valor (em r$)",
            "valor (r$)",
            "valor r$",
            "amount",
            "transaction amount",
            "value",
            "importe",
        ],
    ),
];

pub(crate) fn canonical_field(header: &str) -> Option<CanonicalField> {
    let normalized = normalize_header(header);
    SYNONYMS
        .iter()
        .find(|(_, names)| names.contains(&normalized.as_str()))
        .map(|(field, _)| *field)
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// How the signed amount of a row is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AmountSource {
    IncomeMinusExpense { income: usize, expense: usize },
    Income(usize),
    NegatedExpense(usize),
    Direct(usize),
}

/// Column index of each canonical field in the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub(crate) date: Option<usize>,
    pub(crate) description: Option<usize>,
    pub(crate) income: Option<usize>,
    pub(crate) expense: Option<usize>,
    pub(crate) amount: Option<usize>,
}

impl ColumnMap {
    /// Map headers onto canonical fields. When several headers land on the
    /// same field the leftmost one is kept; unknown headers are ignored.
    pub(crate) fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for (idx, header) in headers.into_iter().enumerate() {
            let Some(field) = canonical_field(header) else {
                continue;
            };
            let slot = match field {
                CanonicalField::Date => &mut map.date,
                CanonicalField::Description => &mut map.description,
                CanonicalField::Income => &mut map.income,
                CanonicalField::Expense => &mut map.expense,
                CanonicalField::Amount => &mut map.amount,
            };
            slot.get_or_insert(idx);
        }
        map
    }

    /// Income/expense columns take precedence over a direct amount column.
    pub(crate) fn amount_source(&self) -> Option<AmountSource> {
        match (self.income, self.expense, self.amount) {
            (Some(income), Some(expense), _) => {
                Some(AmountSource::IncomeMinusExpense { income, expense })
            }
            (Some(income), None, _) => Some(AmountSource::Income(income)),
            (None, Some(expense), _) => Some(AmountSource::NegatedExpense(expense)),
            (None, None, Some(amount)) => Some(AmountSource::Direct(amount)),
            (None, None, None) => None,
        }
    }
}

#[cfg(test)]
#[path = "columns_tests.rs"]
mod tests;
