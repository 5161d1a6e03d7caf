use super::{CompareOp, Filter, LikePattern, SpatialOp};
use crate::{AttributeValue, Geometry};
use nom::{
	IResult, Parser,
	branch::alt,
	bytes::complete::{tag, tag_no_case, take_while},
	character::complete::{char, multispace0, none_of, satisfy},
	combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value},
	error::context,
	multi::{many0, separated_list1},
	number::complete::{double, recognize_float},
	sequence::{delimited, pair, preceded, terminated},
};
use nom_language::error::{VerboseError, convert_error};
use tilepipe_core::Bbox;

/// A filter expression that could not be parsed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("invalid filter expression '{expression}': {message}")]
pub struct FilterParseError {
	pub expression: String,
	pub message: String,
}

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

fn ws0(input: &str) -> Res<'_, ()> {
	value((), multispace0).parse(input)
}

fn comma(input: &str) -> Res<'_, ()> {
	value((), (ws0, char(','), ws0)).parse(input)
}

/// Case-insensitive keyword that is not the prefix of a longer word.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = VerboseError<&'a str>> {
	terminated(tag_no_case(word), not(satisfy(is_ident_char)))
}

fn name_part(input: &str) -> Res<'_, &str> {
	recognize(pair(
		satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
		take_while(is_ident_char),
	))
	.parse(input)
}

fn attribute(input: &str) -> Res<'_, String> {
	context(
		"parsing attribute",
		map(recognize(separated_list1(char('.'), name_part)), str::to_string),
	)
	.parse(input)
}

fn string_literal(input: &str) -> Res<'_, String> {
	context(
		"parsing string",
		delimited(
			char('\''),
			map(many0(alt((value('\'', tag("''")), none_of("'")))), |chars: Vec<char>| {
				chars.into_iter().collect::<String>()
			}),
			cut(char('\'')),
		),
	)
	.parse(input)
}

fn number_literal(input: &str) -> Res<'_, AttributeValue> {
	context(
		"parsing number",
		map_res(recognize_float, |text: &str| match text.parse::<i64>() {
			Ok(v) => Ok(AttributeValue::Int(v)),
			Err(_) => text.parse::<f64>().map(AttributeValue::Double),
		}),
	)
	.parse(input)
}

fn literal(input: &str) -> Res<'_, AttributeValue> {
	context(
		"parsing literal",
		alt((
			map(string_literal, AttributeValue::String),
			value(AttributeValue::Bool(true), keyword("TRUE")),
			value(AttributeValue::Bool(false), keyword("FALSE")),
			number_literal,
		)),
	)
	.parse(input)
}

fn compare_op(input: &str) -> Res<'_, CompareOp> {
	alt((
		value(CompareOp::Le, tag("<=")),
		value(CompareOp::Ge, tag(">=")),
		value(CompareOp::Ne, tag("<>")),
		value(CompareOp::Ne, tag("!=")),
		value(CompareOp::Eq, tag("=")),
		value(CompareOp::Lt, tag("<")),
		value(CompareOp::Gt, tag(">")),
	))
	.parse(input)
}

/// Everything that may follow the attribute of a predicate.
enum Tail {
	Compare(CompareOp, AttributeValue),
	Between(AttributeValue, AttributeValue),
	In(Vec<AttributeValue>),
	Like(LikePattern),
	IsNull,
}

fn is_null_tail(input: &str) -> Res<'_, (bool, Tail)> {
	map(
		(keyword("IS"), ws0, opt((keyword("NOT"), ws0)), cut(keyword("NULL"))),
		|(_, _, negated, _)| (negated.is_some(), Tail::IsNull),
	)
	.parse(input)
}

fn between_tail(input: &str) -> Res<'_, Tail> {
	map(
		(
			keyword("BETWEEN"),
			ws0,
			cut(literal),
			ws0,
			cut(keyword("AND")),
			ws0,
			cut(literal),
		),
		|(_, _, lower, _, _, _, upper)| Tail::Between(lower, upper),
	)
	.parse(input)
}

fn in_tail(input: &str) -> Res<'_, Tail> {
	map(
		(
			keyword("IN"),
			ws0,
			cut(char('(')),
			ws0,
			cut(separated_list1(comma, literal)),
			ws0,
			cut(char(')')),
		),
		|(_, _, _, _, values, _, _)| Tail::In(values),
	)
	.parse(input)
}

fn like_tail(input: &str) -> Res<'_, Tail> {
	map_res((keyword("LIKE"), ws0, cut(string_literal)), |(_, _, pattern)| {
		LikePattern::new(&pattern).map(Tail::Like)
	})
	.parse(input)
}

fn negatable_tail(input: &str) -> Res<'_, (bool, Tail)> {
	map(
		(
			opt(terminated(keyword("NOT"), ws0)),
			alt((between_tail, in_tail, like_tail)),
		),
		|(negated, tail)| (negated.is_some(), tail),
	)
	.parse(input)
}

fn compare_tail(input: &str) -> Res<'_, (bool, Tail)> {
	map((compare_op, ws0, cut(literal)), |(op, _, v)| (false, Tail::Compare(op, v))).parse(input)
}

fn predicate(input: &str) -> Res<'_, Filter> {
	context(
		"parsing predicate",
		map(
			(attribute, ws0, alt((is_null_tail, negatable_tail, compare_tail))),
			|(attribute, _, (negated, tail))| {
				let filter = match tail {
					Tail::Compare(op, value) => Filter::Compare { attribute, op, value },
					Tail::Between(lower, upper) => Filter::Between { attribute, lower, upper },
					Tail::In(values) => Filter::In { attribute, values },
					Tail::Like(pattern) => Filter::Like { attribute, pattern },
					Tail::IsNull => Filter::IsNull(attribute),
				};
				if negated { Filter::Not(Box::new(filter)) } else { filter }
			},
		),
	)
	.parse(input)
}

fn bbox(input: &str) -> Res<'_, Filter> {
	context(
		"parsing bbox",
		map_res(
			(
				keyword("BBOX"),
				ws0,
				cut(char('(')),
				ws0,
				cut(attribute),
				cut(preceded(comma, double)),
				cut(preceded(comma, double)),
				cut(preceded(comma, double)),
				cut(preceded(comma, double)),
				ws0,
				cut(char(')')),
			),
			|(_, _, _, _, attribute, x_min, y_min, x_max, y_max, _, _)| {
				Bbox::new(x_min, y_min, x_max, y_max).map(|bbox| Filter::Spatial {
					op: SpatialOp::Bbox,
					attribute,
					geometry: Geometry::from_bbox(&bbox),
				})
			},
		),
	)
	.parse(input)
}

fn primary(input: &str) -> Res<'_, Filter> {
	alt((
		delimited((char('('), ws0), expression, (ws0, cut(char(')')))),
		value(Filter::Include, keyword("INCLUDE")),
		value(Filter::Exclude, keyword("EXCLUDE")),
		bbox,
		predicate,
	))
	.parse(input)
}

fn not_expression(input: &str) -> Res<'_, Filter> {
	alt((
		map(preceded((keyword("NOT"), ws0), not_expression), |f| Filter::Not(Box::new(f))),
		primary,
	))
	.parse(input)
}

fn and_expression(input: &str) -> Res<'_, Filter> {
	map(
		separated_list1((ws0, keyword("AND"), ws0), not_expression),
		|mut filters| {
			if filters.len() == 1 {
				filters.remove(0)
			} else {
				Filter::And(filters)
			}
		},
	)
	.parse(input)
}

fn expression(input: &str) -> Res<'_, Filter> {
	context(
		"parsing expression",
		map(
			separated_list1((ws0, keyword("OR"), ws0), and_expression),
			|mut filters| {
				if filters.len() == 1 {
					filters.remove(0)
				} else {
					Filter::Or(filters)
				}
			},
		),
	)
	.parse(input)
}

/// Parse an ECQL-like filter expression.
///
/// A blank expression is [`Filter::Include`].
pub fn parse_filter(input: &str) -> Result<Filter, FilterParseError> {
	if input.trim().is_empty() {
		return Ok(Filter::Include);
	}
	let error = |message: String| FilterParseError {
		expression: input.to_string(),
		message,
	};
	match all_consuming(delimited(ws0, expression, ws0)).parse(input) {
		Ok((_, filter)) => Ok(filter),
		Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(error(convert_error(input, e))),
		Err(nom::Err::Incomplete(_)) => Err(error(String::from("unexpected end of input"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Attributes, Feature};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn parse(input: &str) -> Filter {
		parse_filter(input).unwrap()
	}

	#[test]
	fn blank_is_include() {
		assert_eq!(parse(""), Filter::Include);
		assert_eq!(parse("  \n"), Filter::Include);
		assert_eq!(parse("include"), Filter::Include);
		assert_eq!(parse("EXCLUDE"), Filter::Exclude);
	}

	#[test]
	fn comparison() {
		assert_eq!(
			parse("a.b < 5"),
			Filter::Compare {
				attribute: "a.b".to_string(),
				op: CompareOp::Lt,
				value: AttributeValue::Int(5),
			}
		);
		assert_eq!(
			parse("name<>'it''s'"),
			Filter::Compare {
				attribute: "name".to_string(),
				op: CompareOp::Ne,
				value: AttributeValue::String("it's".to_string()),
			}
		);
		assert_eq!(
			parse("ratio >= -0.25"),
			Filter::Compare {
				attribute: "ratio".to_string(),
				op: CompareOp::Ge,
				value: AttributeValue::Double(-0.25),
			}
		);
	}

	#[test]
	fn precedence() {
		let filter = parse("a = 1 OR b = 2 AND NOT c = 3");
		assert_eq!(filter.to_string(), "a = 1 OR (b = 2 AND NOT (c = 3))");
		let filter = parse("(a = 1 OR b = 2) AND c = 3");
		assert_eq!(filter.to_string(), "(a = 1 OR b = 2) AND c = 3");
	}

	#[rstest]
	#[case("size BETWEEN 1 AND 5.5", "size BETWEEN 1 AND 5.5")]
	#[case("size not between 1 and 5", "NOT (size BETWEEN 1 AND 5)")]
	#[case("kind IN ('a', 'b',3)", "kind IN ('a', 'b', 3)")]
	#[case("kind NOT IN (1)", "NOT (kind IN (1))")]
	#[case("name LIKE 'Bru%'", "name LIKE 'Bru%'")]
	#[case("name NOT LIKE '_x'", "NOT (name LIKE '_x')")]
	#[case("name IS NULL", "name IS NULL")]
	#[case("name is not null", "NOT (name IS NULL)")]
	#[case("open = true", "open = true")]
	#[case("BBOX(the_geom, -10, -5.5, 10, 5)", "BBOX(the_geom, -10, -5.5, 10, 5)")]
	#[case("size between 1 and 5 and open = false", "size BETWEEN 1 AND 5 AND open = false")]
	fn display_after_parse(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(parse(input).to_string(), expected);
	}

	#[rstest]
	#[case("a <")]
	#[case("a = 'open")]
	#[case("= 5")]
	#[case("a = 1 AND")]
	#[case("a BETWEEN 1")]
	#[case("BBOX(g, 10, 0, 0, 10)")]
	#[case("a = 1 b = 2")]
	fn malformed(#[case] input: &str) {
		let error = parse_filter(input).unwrap_err();
		assert_eq!(error.expression, input);
		assert!(error.to_string().starts_with("invalid filter expression"));
	}

	#[test]
	fn keywords_need_word_boundaries() {
		assert_eq!(
			parse("ORDER = 1 OR ANDROID = 2"),
			Filter::Or(vec![
				Filter::Compare {
					attribute: "ORDER".to_string(),
					op: CompareOp::Eq,
					value: AttributeValue::Int(1),
				},
				Filter::Compare {
					attribute: "ANDROID".to_string(),
					op: CompareOp::Eq,
					value: AttributeValue::Int(2),
				},
			])
		);
	}

	#[test]
	fn parsed_filter_evaluates() {
		let mut inner = Attributes::new();
		inner.insert("b", 3);
		let mut attributes = Attributes::new();
		attributes.insert("a", inner);
		let feature = Feature::new("1", attributes, None);
		assert!(parse("a.b < 5").evaluate(&feature));
		assert!(!parse("a.b >= 5").evaluate(&feature));
		assert!(parse("a.b BETWEEN 3 AND 3").evaluate(&feature));
		assert!(parse("a.c IS NULL AND a.b IN (1, 2, 3)").evaluate(&feature));
	}
}
