//! Text/range model, the closed syntax-tree variants, the ingestion parser for
//! the TS/TSX subset the rules inspect, and the document-order walk.
//!
//! The parser is deliberately a shim: shapes the rules never look inside
//! degrade to opaque `Raw` spans with exact byte ranges, and malformed input
//! always advances instead of failing.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Span {
	pub(crate) start: usize,
	pub(crate) end: usize,
}
impl Span {
	pub(crate) fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.end <= self.start
	}

	pub(crate) fn text<'a>(&self, source: &'a str) -> &'a str {
		source.get(self.start..self.end).unwrap_or("")
	}
}

#[derive(Debug)]
pub(crate) struct Program {
	pub(crate) statements: Vec<Stmt>,
}
impl Program {
	pub(crate) fn last_import_end(&self) -> Option<usize> {
		self.statements
			.iter()
			.filter_map(|stmt| match stmt {
				Stmt::Import(decl) => Some(decl.span.end),
				_ => None,
			})
			.last()
	}

	pub(crate) fn last_statement_end(&self) -> Option<usize> {
		self.statements.last().map(|stmt| stmt.span().end)
	}
}

#[derive(Debug)]
pub(crate) enum Stmt {
	Import(ImportDecl),
	Var(VarDecl),
	Fn(FnDecl),
	ExportDefaultExpr(ExportDefaultExpr),
	Return(ReturnStmt),
	Expr(ExprStmt),
	Raw(Span),
}
impl Stmt {
	pub(crate) fn span(&self) -> Span {
		match self {
			Self::Import(decl) => decl.span,
			Self::Var(decl) => decl.span,
			Self::Fn(decl) => decl.span,
			Self::ExportDefaultExpr(decl) => decl.span,
			Self::Return(stmt) => stmt.span,
			Self::Expr(stmt) => stmt.span,
			Self::Raw(span) => *span,
		}
	}
}

#[derive(Clone, Debug)]
pub(crate) struct Ident {
	pub(crate) span: Span,
	pub(crate) name: String,
}

#[derive(Clone, Debug)]
pub(crate) struct StringLit {
	pub(crate) span: Span,
	pub(crate) value: String,
}

#[derive(Debug)]
pub(crate) struct ImportDecl {
	pub(crate) span: Span,
	pub(crate) type_only: bool,
	pub(crate) specifiers: Vec<ImportSpecifier>,
	pub(crate) source: StringLit,
}

#[derive(Debug)]
pub(crate) enum ImportSpecifier {
	Named(NamedSpecifier),
	Default(Ident),
	Namespace(Ident),
}

#[derive(Debug)]
pub(crate) struct NamedSpecifier {
	pub(crate) span: Span,
	pub(crate) imported: Ident,
	pub(crate) local: Option<Ident>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum VarKind {
	Const,
	Let,
	Var,
}
impl VarKind {
	pub(crate) fn keyword(&self) -> &'static str {
		match self {
			Self::Const => "const",
			Self::Let => "let",
			Self::Var => "var",
		}
	}
}

#[derive(Debug)]
pub(crate) struct VarDecl {
	pub(crate) span: Span,
	pub(crate) export_span: Option<Span>,
	pub(crate) kind: VarKind,
	pub(crate) kind_span: Span,
	pub(crate) name: Option<Ident>,
	pub(crate) type_ann: Option<TypeAnn>,
	pub(crate) init: Option<Expr>,
}

#[derive(Debug)]
pub(crate) struct TypeAnn {
	pub(crate) span: Span,
	pub(crate) ty: TypeExpr,
}

#[derive(Debug)]
pub(crate) struct TypeExpr {
	pub(crate) span: Span,
}

#[derive(Debug)]
pub(crate) struct TypeArgs {
	pub(crate) span: Span,
	pub(crate) args: Vec<TypeExpr>,
}

#[derive(Debug)]
pub(crate) struct FnDecl {
	pub(crate) span: Span,
	pub(crate) export_default: bool,
	pub(crate) is_async: bool,
	pub(crate) name: Option<Ident>,
	pub(crate) params: ParamList,
	pub(crate) body: Block,
}

#[derive(Debug)]
pub(crate) struct ParamList {
	pub(crate) span: Span,
	pub(crate) params: Vec<Param>,
}

#[derive(Debug)]
pub(crate) struct Param {
	pub(crate) name: Option<Ident>,
	pub(crate) type_ann: Option<TypeAnn>,
}

#[derive(Debug)]
pub(crate) struct Block {
	pub(crate) span: Span,
	pub(crate) statements: Vec<Stmt>,
}

#[derive(Debug)]
pub(crate) struct ExportDefaultExpr {
	pub(crate) span: Span,
	pub(crate) expr: Expr,
}

#[derive(Debug)]
pub(crate) struct ReturnStmt {
	pub(crate) span: Span,
	pub(crate) argument: Option<Expr>,
}

#[derive(Debug)]
pub(crate) struct ExprStmt {
	pub(crate) span: Span,
	pub(crate) expr: Expr,
}

#[derive(Debug)]
pub(crate) enum Expr {
	Ident(Ident),
	Str(StringLit),
	Num(Span),
	Bool(Span),
	Null(Span),
	Template(TemplateLit),
	Array(ArrayLit),
	Object(ObjectLit),
	Arrow(Box<ArrowFn>),
	FnExpr(Box<FnExpr>),
	Call(Box<CallExpr>),
	Member(Box<MemberExpr>),
	Await(Box<AwaitExpr>),
	Paren(Box<ParenExpr>),
	Jsx(Span),
	Raw(Span),
}
impl Expr {
	pub(crate) fn span(&self) -> Span {
		match self {
			Self::Ident(ident) => ident.span,
			Self::Str(lit) => lit.span,
			Self::Num(span) | Self::Bool(span) | Self::Null(span) | Self::Jsx(span)
			| Self::Raw(span) => *span,
			Self::Template(template) => template.span,
			Self::Array(array) => array.span,
			Self::Object(object) => object.span,
			Self::Arrow(arrow) => arrow.span,
			Self::FnExpr(func) => func.span,
			Self::Call(call) => call.span,
			Self::Member(member) => member.span,
			Self::Await(awaited) => awaited.span,
			Self::Paren(paren) => paren.span,
		}
	}
}

/// Strip parentheses from around an expression.
pub(crate) fn unwrap_expr(expr: &Expr) -> &Expr {
	match expr {
		Expr::Paren(paren) => unwrap_expr(&paren.expr),
		_ => expr,
	}
}

#[derive(Debug)]
pub(crate) struct TemplateLit {
	pub(crate) span: Span,
	pub(crate) quasis: Vec<String>,
	pub(crate) exprs: Vec<Expr>,
}

#[derive(Debug)]
pub(crate) struct ArrayLit {
	pub(crate) span: Span,
	pub(crate) elements: Vec<Expr>,
}

#[derive(Debug)]
pub(crate) struct ObjectLit {
	pub(crate) span: Span,
	pub(crate) properties: Vec<ObjectProp>,
}
impl ObjectLit {
	pub(crate) fn has_key(&self, key: &str) -> bool {
		self.properties.iter().any(|prop| prop.key.as_deref() == Some(key))
	}
}

#[derive(Debug)]
pub(crate) struct ObjectProp {
	pub(crate) key: Option<String>,
	pub(crate) value: Option<Expr>,
}

#[derive(Debug)]
pub(crate) struct ArrowFn {
	pub(crate) span: Span,
	pub(crate) is_async: bool,
	pub(crate) params: ParamList,
	pub(crate) body: ArrowBody,
}

#[derive(Debug)]
pub(crate) enum ArrowBody {
	Block(Block),
	Expr(Expr),
}

#[derive(Debug)]
pub(crate) struct FnExpr {
	pub(crate) span: Span,
	pub(crate) is_async: bool,
	pub(crate) params: ParamList,
	pub(crate) body: Block,
}

#[derive(Debug)]
pub(crate) struct CallExpr {
	pub(crate) span: Span,
	pub(crate) callee: Expr,
	pub(crate) type_args: Option<TypeArgs>,
	pub(crate) args_span: Span,
	pub(crate) args: Vec<Expr>,
}
impl CallExpr {
	pub(crate) fn callee_name(&self) -> Option<&str> {
		match &self.callee {
			Expr::Ident(ident) => Some(ident.name.as_str()),
			Expr::Member(member) => Some(member.property.name.as_str()),
			_ => None,
		}
	}

	pub(crate) fn is_method_call(&self) -> bool {
		matches!(&self.callee, Expr::Member(_))
	}
}

#[derive(Debug)]
pub(crate) struct MemberExpr {
	pub(crate) span: Span,
	pub(crate) object: Expr,
	pub(crate) property: Ident,
}

#[derive(Debug)]
pub(crate) struct AwaitExpr {
	pub(crate) span: Span,
	pub(crate) expr: Expr,
}

#[derive(Debug)]
pub(crate) struct ParenExpr {
	pub(crate) span: Span,
	pub(crate) expr: Expr,
}

#[derive(Debug)]
pub(crate) enum NodeEvent<'a> {
	Import(&'a ImportDecl),
	Var { decl: &'a VarDecl, top_level: bool },
	Fn(&'a FnDecl),
	ExportDefault(&'a ExportDefaultExpr),
	Call(&'a CallExpr),
}

/// Single document-order traversal dispatching every rule-relevant node.
pub(crate) fn walk(program: &Program, visit: &mut dyn FnMut(NodeEvent<'_>)) {
	for stmt in &program.statements {
		walk_stmt(stmt, true, visit);
	}
}

fn walk_stmt(stmt: &Stmt, top_level: bool, visit: &mut dyn FnMut(NodeEvent<'_>)) {
	match stmt {
		Stmt::Import(decl) => visit(NodeEvent::Import(decl)),
		Stmt::Var(decl) => {
			visit(NodeEvent::Var { decl, top_level });

			if let Some(init) = &decl.init {
				walk_expr(init, visit);
			}
		},
		Stmt::Fn(decl) => {
			visit(NodeEvent::Fn(decl));
			walk_block(&decl.body, visit);
		},
		Stmt::ExportDefaultExpr(decl) => {
			visit(NodeEvent::ExportDefault(decl));
			walk_expr(&decl.expr, visit);
		},
		Stmt::Return(stmt) =>
			if let Some(argument) = &stmt.argument {
				walk_expr(argument, visit);
			},
		Stmt::Expr(stmt) => walk_expr(&stmt.expr, visit),
		Stmt::Raw(_) => {},
	}
}

fn walk_block(block: &Block, visit: &mut dyn FnMut(NodeEvent<'_>)) {
	for stmt in &block.statements {
		walk_stmt(stmt, false, visit);
	}
}

fn walk_expr(expr: &Expr, visit: &mut dyn FnMut(NodeEvent<'_>)) {
	match expr {
		Expr::Call(call) => {
			visit(NodeEvent::Call(call));
			walk_expr(&call.callee, visit);

			for arg in &call.args {
				walk_expr(arg, visit);
			}
		},
		Expr::Array(array) =>
			for element in &array.elements {
				walk_expr(element, visit);
			},
		Expr::Object(object) =>
			for prop in &object.properties {
				if let Some(value) = &prop.value {
					walk_expr(value, visit);
				}
			},
		Expr::Arrow(arrow) => match &arrow.body {
			ArrowBody::Block(block) => walk_block(block, visit),
			ArrowBody::Expr(expr) => walk_expr(expr, visit),
		},
		Expr::FnExpr(func) => walk_block(&func.body, visit),
		Expr::Member(member) => walk_expr(&member.object, visit),
		Expr::Await(awaited) => walk_expr(&awaited.expr, visit),
		Expr::Paren(paren) => walk_expr(&paren.expr, visit),
		Expr::Template(template) =>
			for expr in &template.exprs {
				walk_expr(expr, visit);
			},
		_ => {},
	}
}

pub(crate) fn parse_program(text: &str) -> Program {
	let mut parser = Parser::new(text);
	let mut statements = Vec::new();

	loop {
		parser.skip_trivia();

		if parser.at_end() {
			break;
		}

		let before = parser.pos;

		if let Some(stmt) = parser.parse_stmt() {
			statements.push(stmt);
		}
		if parser.pos == before && !parser.advance_token() {
			break;
		}
	}

	Program { statements }
}

const RAW_STMT_KEYWORDS: [&str; 14] = [
	"if",
	"for",
	"while",
	"do",
	"switch",
	"try",
	"class",
	"interface",
	"type",
	"enum",
	"namespace",
	"declare",
	"throw",
	"debugger",
];

fn is_ident_start(ch: char) -> bool {
	ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch == '$'
}

const OPERATOR_BYTES: [u8; 14] =
	[b'+', b'-', b'*', b'/', b'%', b'&', b'|', b'^', b'=', b'<', b'>', b'?', b':', b'.'];

struct Parser<'a> {
	text: &'a str,
	bytes: &'a [u8],
	pos: usize,
}
impl<'a> Parser<'a> {
	fn new(text: &'a str) -> Self {
		Self { text, bytes: text.as_bytes(), pos: 0 }
	}

	fn at_end(&self) -> bool {
		self.pos >= self.bytes.len()
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn peek_at(&self, offset: usize) -> Option<u8> {
		self.bytes.get(self.pos + offset).copied()
	}

	fn rest(&self) -> &'a str {
		self.text.get(self.pos..).unwrap_or("")
	}

	fn skip_trivia(&mut self) {
		loop {
			match self.peek() {
				Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => self.pos += 1,
				Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
				Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
				_ => break,
			}
		}
	}

	fn skip_inline_ws(&mut self) {
		while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
			self.pos += 1;
		}
	}

	fn skip_line_comment(&mut self) {
		while let Some(ch) = self.peek() {
			if ch == b'\n' {
				break;
			}

			self.pos += 1;
		}
	}

	fn skip_block_comment(&mut self) {
		self.pos += 2;

		while self.pos < self.bytes.len() {
			if self.bytes[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
				self.pos += 2;

				return;
			}

			self.pos += 1;
		}
	}

	fn skip_string(&mut self) {
		let Some(quote) = self.peek() else {
			return;
		};

		self.pos += 1;

		loop {
			match self.peek() {
				None => break,
				Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
				Some(ch) if ch == quote => {
					self.pos += 1;

					break;
				},
				Some(b'\n') => break,
				_ => self.pos += 1,
			}
		}
	}

	fn skip_template_raw(&mut self) {
		self.pos += 1;

		loop {
			match self.peek() {
				None => break,
				Some(b'`') => {
					self.pos += 1;

					break;
				},
				Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
				Some(b'$') if self.peek_at(1) == Some(b'{') => {
					self.pos += 1;
					self.skip_balanced(b'{', b'}');
				},
				_ => self.pos += 1,
			}
		}
	}

	fn skip_balanced(&mut self, open: u8, close: u8) {
		let mut depth = 0_i32;

		while let Some(ch) = self.peek() {
			if ch == open {
				depth += 1;
				self.pos += 1;

				continue;
			}
			if ch == close {
				depth -= 1;
				self.pos += 1;

				if depth <= 0 {
					break;
				}

				continue;
			}

			match ch {
				b'"' | b'\'' => self.skip_string(),
				b'`' => self.skip_template_raw(),
				b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
				b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
				_ => self.pos += 1,
			}
		}
	}

	fn advance_token(&mut self) -> bool {
		if self.parse_ident().is_some() {
			return true;
		}

		match self.rest().chars().next() {
			Some(ch) => {
				self.pos += ch.len_utf8();

				true
			},
			None if self.pos < self.bytes.len() => {
				self.pos += 1;

				true
			},
			None => false,
		}
	}

	fn word_at(&self, word: &str) -> bool {
		let bytes = word.as_bytes();

		if self.bytes.get(self.pos..self.pos + bytes.len()) != Some(bytes) {
			return false;
		}

		match self.bytes.get(self.pos + bytes.len()) {
			None => true,
			Some(next) =>
				!(next.is_ascii_alphanumeric() || *next == b'_' || *next == b'$' || *next >= 0x80),
		}
	}

	fn eat_word(&mut self, word: &str) -> Option<Span> {
		if !self.word_at(word) {
			return None;
		}

		let span = Span::new(self.pos, self.pos + word.len());

		self.pos = span.end;

		Some(span)
	}

	fn parse_ident(&mut self) -> Option<Ident> {
		let rest = self.rest();
		let mut chars = rest.char_indices();
		let (_, first) = chars.next()?;

		if !is_ident_start(first) {
			return None;
		}

		let mut end_offset = first.len_utf8();

		for (idx, ch) in chars {
			if !is_ident_continue(ch) {
				break;
			}

			end_offset = idx + ch.len_utf8();
		}

		let span = Span::new(self.pos, self.pos + end_offset);
		let name = rest[..end_offset].to_owned();

		self.pos = span.end;

		Some(Ident { span, name })
	}

	fn parse_string_lit(&mut self) -> Option<StringLit> {
		let quote = match self.peek()? {
			quote @ (b'"' | b'\'') => quote,
			_ => return None,
		};
		let start = self.pos;

		self.pos += 1;

		let value_start = self.pos;

		loop {
			match self.peek() {
				None | Some(b'\n') => return None,
				Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
				Some(ch) if ch == quote => {
					let value = self.text.get(value_start..self.pos).unwrap_or("").to_owned();

					self.pos += 1;

					return Some(StringLit { span: Span::new(start, self.pos), value });
				},
				_ => self.pos += 1,
			}
		}
	}

	fn parse_stmt(&mut self) -> Option<Stmt> {
		self.skip_trivia();

		let start = self.pos;

		match self.peek()? {
			b'}' => return None,
			b';' => {
				self.pos += 1;

				return Some(Stmt::Raw(Span::new(start, self.pos)));
			},
			_ => {},
		}

		if self.word_at("import") {
			return Some(self.parse_import_stmt(start));
		}
		if self.word_at("export") {
			return Some(self.parse_export_stmt(start));
		}
		if self.word_at("const") || self.word_at("let") || self.word_at("var") {
			return Some(self.parse_var_stmt(start, None));
		}
		if self.word_at("function") {
			return Some(self.parse_fn_stmt(start, false, false));
		}
		if self.word_at("async") {
			let checkpoint = self.pos;

			self.eat_word("async");
			self.skip_trivia();

			if self.word_at("function") {
				return Some(self.parse_fn_stmt(start, false, true));
			}

			self.pos = checkpoint;
		}
		if self.word_at("return") {
			return Some(self.parse_return_stmt(start));
		}

		for keyword in RAW_STMT_KEYWORDS {
			if self.word_at(keyword) {
				return Some(self.parse_raw_construct(start));
			}
		}

		Some(self.parse_expr_stmt(start))
	}

	fn parse_import_stmt(&mut self, start: usize) -> Stmt {
		self.eat_word("import");
		self.skip_trivia();

		// `import(...)` and `import.meta` are expressions, not declarations.
		if matches!(self.peek(), Some(b'(') | Some(b'.')) {
			self.pos = start;

			return self.parse_expr_stmt(start);
		}

		let mut type_only = false;

		if self.word_at("type") {
			let checkpoint = self.pos;

			self.eat_word("type");
			self.skip_trivia();

			if self.word_at("from") || self.peek() == Some(b'=') {
				self.pos = checkpoint;
			} else {
				type_only = true;
			}
		}

		let mut specifiers = Vec::new();

		if !matches!(self.peek(), Some(b'"') | Some(b'\'')) {
			loop {
				self.skip_trivia();

				match self.peek() {
					Some(b'{') => {
						self.pos += 1;

						loop {
							self.skip_trivia();

							match self.peek() {
								None => return self.raw_stmt_to_semi(start),
								Some(b'}') => {
									self.pos += 1;

									break;
								},
								Some(b',') => self.pos += 1,
								_ => {
									let Some(spec) = self.parse_named_specifier() else {
										return self.raw_stmt_to_semi(start);
									};

									specifiers.push(ImportSpecifier::Named(spec));
								},
							}
						}
					},
					Some(b'*') => {
						self.pos += 1;
						self.skip_trivia();

						if self.eat_word("as").is_none() {
							return self.raw_stmt_to_semi(start);
						}

						self.skip_trivia();

						let Some(local) = self.parse_ident() else {
							return self.raw_stmt_to_semi(start);
						};

						specifiers.push(ImportSpecifier::Namespace(local));
					},
					_ => {
						let Some(local) = self.parse_ident() else {
							return self.raw_stmt_to_semi(start);
						};

						specifiers.push(ImportSpecifier::Default(local));
					},
				}

				self.skip_trivia();

				if self.peek() == Some(b',') {
					self.pos += 1;

					continue;
				}

				break;
			}

			self.skip_trivia();

			if self.eat_word("from").is_none() {
				return self.raw_stmt_to_semi(start);
			}

			self.skip_trivia();
		}

		let Some(source) = self.parse_string_lit() else {
			return self.raw_stmt_to_semi(start);
		};

		self.skip_inline_ws();

		if self.peek() == Some(b';') {
			self.pos += 1;
		}

		Stmt::Import(ImportDecl { span: Span::new(start, self.pos), type_only, specifiers, source })
	}

	fn parse_named_specifier(&mut self) -> Option<NamedSpecifier> {
		let mut imported = self.parse_ident()?;

		// Inline type specifier: `import { type Foo } from ...`.
		if imported.name == "type" {
			self.skip_trivia();

			if let Some(actual) = self.parse_ident() {
				imported = actual;
			}
		}

		let mut local = None;

		self.skip_trivia();

		if self.word_at("as") {
			self.eat_word("as");
			self.skip_trivia();

			local = Some(self.parse_ident()?);
		}

		let end = local.as_ref().map_or(imported.span.end, |ident| ident.span.end);

		Some(NamedSpecifier { span: Span::new(imported.span.start, end), imported, local })
	}

	fn parse_export_stmt(&mut self, start: usize) -> Stmt {
		let Some(export_span) = self.eat_word("export") else {
			return self.raw_stmt_to_semi(start);
		};

		self.skip_trivia();

		if self.word_at("default") {
			self.eat_word("default");
			self.skip_trivia();

			let is_async = if self.word_at("async") {
				let checkpoint = self.pos;

				self.eat_word("async");
				self.skip_trivia();

				if self.word_at("function") {
					true
				} else {
					self.pos = checkpoint;

					false
				}
			} else {
				false
			};

			if self.word_at("function") {
				return self.parse_fn_stmt(start, true, is_async);
			}

			let expr = self.parse_expr();

			self.skip_inline_ws();

			if self.peek() == Some(b';') {
				self.pos += 1;
			}

			return Stmt::ExportDefaultExpr(ExportDefaultExpr {
				span: Span::new(start, self.pos),
				expr,
			});
		}
		if self.word_at("const") || self.word_at("let") || self.word_at("var") {
			return self.parse_var_stmt(start, Some(export_span));
		}

		self.parse_raw_construct(start)
	}

	fn parse_var_stmt(&mut self, start: usize, export_span: Option<Span>) -> Stmt {
		let kind_start = self.pos;
		let kind = if self.eat_word("const").is_some() {
			VarKind::Const
		} else if self.eat_word("let").is_some() {
			VarKind::Let
		} else if self.eat_word("var").is_some() {
			VarKind::Var
		} else {
			return self.raw_stmt_to_semi(start);
		};
		let kind_span = Span::new(kind_start, self.pos);

		self.skip_trivia();

		let name = self.parse_ident();

		if name.is_none() {
			match self.peek() {
				Some(b'{') => self.skip_balanced(b'{', b'}'),
				Some(b'[') => self.skip_balanced(b'[', b']'),
				_ => return self.raw_stmt_to_semi(start),
			}
		}

		self.skip_trivia();

		let type_ann = if self.peek() == Some(b':') { Some(self.parse_type_ann()) } else { None };

		self.skip_trivia();

		let init = if self.peek() == Some(b'=') && self.peek_at(1) != Some(b'=') {
			self.pos += 1;
			self.skip_trivia();

			Some(self.parse_expr())
		} else {
			None
		};

		self.skip_inline_ws();

		// Extra declarators are carried opaquely inside the statement span.
		if self.peek() == Some(b',') {
			self.scan_raw_until_stmt_end();
		} else if self.peek() == Some(b';') {
			self.pos += 1;
		}

		Stmt::Var(VarDecl {
			span: Span::new(start, self.pos),
			export_span,
			kind,
			kind_span,
			name,
			type_ann,
			init,
		})
	}

	fn parse_type_ann(&mut self) -> TypeAnn {
		let ann_start = self.pos;

		self.pos += 1;
		self.skip_trivia();

		let ty = self.scan_type(&[b'=', b','], false);

		TypeAnn { span: Span::new(ann_start, ty.span.end.max(ann_start + 1)), ty }
	}

	fn parse_fn_stmt(&mut self, start: usize, export_default: bool, is_async: bool) -> Stmt {
		self.eat_word("function");
		self.skip_trivia();

		let name = self.parse_ident();

		self.skip_trivia();

		let Some(params) = self.parse_param_list() else {
			return self.raw_stmt_to_semi(start);
		};

		self.skip_trivia();

		if self.peek() == Some(b':') {
			self.pos += 1;
			self.skip_trivia();
			self.scan_type(&[b'{'], true);
			self.skip_trivia();
		}

		let Some(body) = self.parse_block() else {
			return self.raw_stmt_to_semi(start);
		};

		Stmt::Fn(FnDecl {
			span: Span::new(start, self.pos),
			export_default,
			is_async,
			name,
			params,
			body,
		})
	}

	fn parse_return_stmt(&mut self, start: usize) -> Stmt {
		self.eat_word("return");
		self.skip_inline_ws();

		let argument = match self.peek() {
			None | Some(b';') | Some(b'}') | Some(b'\n') | Some(b'\r') => None,
			_ => Some(self.parse_expr()),
		};

		self.skip_inline_ws();

		if self.peek() == Some(b';') {
			self.pos += 1;
		}

		Stmt::Return(ReturnStmt { span: Span::new(start, self.pos), argument })
	}

	fn parse_raw_construct(&mut self, start: usize) -> Stmt {
		loop {
			self.skip_trivia();

			match self.peek() {
				None => break,
				Some(b';') => {
					self.pos += 1;

					break;
				},
				Some(b'}') => break,
				Some(b'{') => {
					self.skip_balanced(b'{', b'}');

					let checkpoint = self.pos;

					self.skip_trivia();

					// `else`/`catch`/`finally`/`while` keep the construct open.
					if self.word_at("else")
						|| self.word_at("catch") || self.word_at("finally")
						|| self.word_at("while")
					{
						continue;
					}

					self.pos = checkpoint;
					self.skip_inline_ws();

					if self.peek() == Some(b';') {
						self.pos += 1;
					}

					break;
				},
				Some(b'(') => self.skip_balanced(b'(', b')'),
				Some(b'[') => self.skip_balanced(b'[', b']'),
				Some(b'"') | Some(b'\'') => self.skip_string(),
				Some(b'`') => self.skip_template_raw(),
				_ =>
					if !self.advance_token() {
						break;
					},
			}
		}

		Stmt::Raw(Span::new(start, self.pos))
	}

	fn raw_stmt_to_semi(&mut self, start: usize) -> Stmt {
		self.scan_raw_until_stmt_end();

		Stmt::Raw(Span::new(start, self.pos))
	}

	fn scan_raw_until_stmt_end(&mut self) {
		loop {
			match self.peek() {
				None => break,
				Some(b';') => {
					self.pos += 1;

					break;
				},
				Some(b'}') => break,
				Some(b'{') => self.skip_balanced(b'{', b'}'),
				Some(b'(') => self.skip_balanced(b'(', b')'),
				Some(b'[') => self.skip_balanced(b'[', b']'),
				Some(b'"') | Some(b'\'') => self.skip_string(),
				Some(b'`') => self.skip_template_raw(),
				Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
				Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
				_ =>
					if !self.advance_token() {
						break;
					},
			}
		}
	}

	fn parse_expr_stmt(&mut self, start: usize) -> Stmt {
		let expr = self.parse_expr();

		self.skip_inline_ws();

		if self.peek() == Some(b';') {
			self.pos += 1;
		}

		Stmt::Expr(ExprStmt { span: Span::new(start, self.pos), expr })
	}

	fn parse_expr(&mut self) -> Expr {
		self.skip_trivia();

		let start = self.pos;
		let expr = self.parse_expr_structured(start);

		// Binary/assignment continuations degrade to an opaque span; rules
		// never look inside those.
		if self.binary_continues() {
			self.pos = start;

			return Expr::Raw(self.scan_raw_expr());
		}

		expr
	}

	fn parse_expr_structured(&mut self, start: usize) -> Expr {
		if self.word_at("async") {
			let checkpoint = self.pos;

			self.eat_word("async");
			self.skip_trivia();

			if self.word_at("function") {
				return self.parse_fn_expr(start, true);
			}
			if let Some(arrow) = self.try_parse_arrow(start, true) {
				return Expr::Arrow(Box::new(arrow));
			}

			self.pos = checkpoint;
		}
		if self.word_at("await") {
			self.eat_word("await");
			self.skip_trivia();

			let inner = self.parse_expr_structured(self.pos);

			return Expr::Await(Box::new(AwaitExpr {
				span: Span::new(start, inner.span().end.max(start)),
				expr: inner,
			}));
		}
		if self.word_at("function") {
			return self.parse_fn_expr(start, false);
		}
		if self.word_at("new") {
			self.eat_word("new");
			self.skip_trivia();

			return self.parse_postfix_chain();
		}
		if let Some(arrow) = self.try_parse_arrow(start, false) {
			return Expr::Arrow(Box::new(arrow));
		}

		self.parse_postfix_chain()
	}

	fn parse_fn_expr(&mut self, start: usize, is_async: bool) -> Expr {
		let checkpoint = self.pos;

		self.eat_word("function");
		self.skip_trivia();

		let _name = self.parse_ident();

		self.skip_trivia();

		let Some(params) = self.parse_param_list() else {
			self.pos = checkpoint;

			return Expr::Raw(self.scan_raw_expr());
		};

		self.skip_trivia();

		if self.peek() == Some(b':') {
			self.pos += 1;
			self.skip_trivia();
			self.scan_type(&[b'{'], true);
			self.skip_trivia();
		}

		let Some(body) = self.parse_block() else {
			self.pos = checkpoint;

			return Expr::Raw(self.scan_raw_expr());
		};

		Expr::FnExpr(Box::new(FnExpr { span: Span::new(start, self.pos), is_async, params, body }))
	}

	fn try_parse_arrow(&mut self, start: usize, is_async: bool) -> Option<ArrowFn> {
		let checkpoint = self.pos;

		match self.peek()? {
			b'(' => {
				if !self.parens_lead_to_arrow() {
					return None;
				}

				let Some(params) = self.parse_param_list() else {
					self.pos = checkpoint;

					return None;
				};

				self.skip_trivia();

				if self.peek() == Some(b':') {
					self.pos += 1;
					self.skip_trivia();
					self.scan_type(&[b';', b','], true);
					self.skip_trivia();
				}
				if !(self.peek() == Some(b'=') && self.peek_at(1) == Some(b'>')) {
					self.pos = checkpoint;

					return None;
				}

				self.pos += 2;

				let Some(body) = self.parse_arrow_body() else {
					self.pos = checkpoint;

					return None;
				};
				let end = match &body {
					ArrowBody::Block(block) => block.span.end,
					ArrowBody::Expr(expr) => expr.span().end,
				};

				Some(ArrowFn { span: Span::new(start, end), is_async, params, body })
			},
			ch if ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$' => {
				let ident = self.parse_ident()?;

				self.skip_inline_ws();

				if !(self.peek() == Some(b'=') && self.peek_at(1) == Some(b'>')) {
					self.pos = checkpoint;

					return None;
				}

				self.pos += 2;

				let params = ParamList {
					span: ident.span,
					params: vec![Param { name: Some(ident), type_ann: None }],
				};
				let Some(body) = self.parse_arrow_body() else {
					self.pos = checkpoint;

					return None;
				};
				let end = match &body {
					ArrowBody::Block(block) => block.span.end,
					ArrowBody::Expr(expr) => expr.span().end,
				};

				Some(ArrowFn { span: Span::new(start, end), is_async, params, body })
			},
			_ => None,
		}
	}

	fn parens_lead_to_arrow(&self) -> bool {
		let mut probe = Parser { text: self.text, bytes: self.bytes, pos: self.pos };

		probe.skip_balanced(b'(', b')');
		probe.skip_trivia();

		match probe.peek() {
			Some(b'=') if probe.peek_at(1) == Some(b'>') => true,
			Some(b':') => {
				probe.pos += 1;
				probe.skip_trivia();
				probe.scan_type(&[b';', b','], true);
				probe.skip_trivia();

				probe.peek() == Some(b'=') && probe.peek_at(1) == Some(b'>')
			},
			_ => false,
		}
	}

	fn parse_arrow_body(&mut self) -> Option<ArrowBody> {
		self.skip_trivia();

		if self.peek() == Some(b'{') {
			return self.parse_block().map(ArrowBody::Block);
		}

		Some(ArrowBody::Expr(self.parse_expr()))
	}

	fn parse_param_list(&mut self) -> Option<ParamList> {
		if self.peek() != Some(b'(') {
			return None;
		}

		let start = self.pos;

		self.pos += 1;

		let mut params = Vec::new();

		loop {
			self.skip_trivia();

			match self.peek() {
				None => return None,
				Some(b')') => {
					self.pos += 1;

					break;
				},
				Some(b',') => self.pos += 1,
				_ => {
					let before = self.pos;
					let Some(param) = self.parse_param() else {
						return None;
					};

					params.push(param);

					if self.pos == before && !self.advance_token() {
						return None;
					}
				},
			}
		}

		Some(ParamList { span: Span::new(start, self.pos), params })
	}

	fn parse_param(&mut self) -> Option<Param> {
		let name = match self.peek()? {
			b'{' => {
				self.skip_balanced(b'{', b'}');

				None
			},
			b'[' => {
				self.skip_balanced(b'[', b']');

				None
			},
			b'.' => {
				while self.peek() == Some(b'.') {
					self.pos += 1;
				}

				let _ = self.parse_ident();

				None
			},
			_ => Some(self.parse_ident()?),
		};

		self.skip_trivia();

		if self.peek() == Some(b'?') {
			self.pos += 1;
			self.skip_trivia();
		}

		let type_ann = if self.peek() == Some(b':') {
			let ann_start = self.pos;

			self.pos += 1;
			self.skip_trivia();

			let ty = self.scan_type(&[b'=', b','], false);

			Some(TypeAnn { span: Span::new(ann_start, ty.span.end.max(ann_start + 1)), ty })
		} else {
			None
		};

		self.skip_trivia();

		// Default value.
		if self.peek() == Some(b'=') && self.peek_at(1) != Some(b'>') {
			self.pos += 1;
			self.skip_trivia();

			let _ = self.parse_expr();
		}

		Some(Param { name, type_ann })
	}

	fn parse_block(&mut self) -> Option<Block> {
		if self.peek() != Some(b'{') {
			return None;
		}

		let start = self.pos;

		self.pos += 1;

		let mut statements = Vec::new();

		loop {
			self.skip_trivia();

			match self.peek() {
				None => break,
				Some(b'}') => {
					self.pos += 1;

					break;
				},
				_ => {
					let before = self.pos;

					if let Some(stmt) = self.parse_stmt() {
						statements.push(stmt);
					}
					if self.pos == before && self.peek() != Some(b'}') && !self.advance_token() {
						break;
					}
				},
			}
		}

		Some(Block { span: Span::new(start, self.pos), statements })
	}

	fn parse_postfix_chain(&mut self) -> Expr {
		let mut expr = self.parse_primary();

		loop {
			let checkpoint = self.pos;

			self.skip_trivia();

			match self.peek() {
				Some(b'.') if self.peek_at(1) != Some(b'.') => {
					self.pos += 1;
					self.skip_trivia();

					let Some(property) = self.parse_ident() else {
						self.pos = checkpoint;

						break;
					};
					let span = Span::new(expr.span().start, property.span.end);

					expr = Expr::Member(Box::new(MemberExpr { span, object: expr, property }));
				},
				Some(b'?') if self.peek_at(1) == Some(b'.') => {
					self.pos += 2;
					self.skip_trivia();

					if let Some(property) = self.parse_ident() {
						let span = Span::new(expr.span().start, property.span.end);

						expr = Expr::Member(Box::new(MemberExpr { span, object: expr, property }));
					}
				},
				Some(b'(') => {
					let Some((args_span, args)) = self.parse_call_args() else {
						self.pos = checkpoint;

						break;
					};
					let span = Span::new(expr.span().start, args_span.end);

					expr = Expr::Call(Box::new(CallExpr {
						span,
						callee: expr,
						type_args: None,
						args_span,
						args,
					}));
				},
				Some(b'<') => {
					let Some(type_args) = self.try_parse_type_args() else {
						self.pos = checkpoint;

						break;
					};

					self.skip_trivia();

					let Some((args_span, args)) = self.parse_call_args() else {
						self.pos = checkpoint;

						break;
					};
					let span = Span::new(expr.span().start, args_span.end);

					expr = Expr::Call(Box::new(CallExpr {
						span,
						callee: expr,
						type_args: Some(type_args),
						args_span,
						args,
					}));
				},
				Some(b'[') => {
					self.skip_balanced(b'[', b']');

					expr = Expr::Raw(Span::new(expr.span().start, self.pos));
				},
				Some(b'!') if self.peek_at(1) != Some(b'=') => self.pos += 1,
				Some(b'`') => {
					// Tagged template.
					self.skip_template_raw();

					expr = Expr::Raw(Span::new(expr.span().start, self.pos));
				},
				_ => {
					self.pos = checkpoint;

					break;
				},
			}
		}

		expr
	}

	fn parse_call_args(&mut self) -> Option<(Span, Vec<Expr>)> {
		if self.peek() != Some(b'(') {
			return None;
		}

		let start = self.pos;

		self.pos += 1;

		let mut args = Vec::new();

		loop {
			self.skip_trivia();

			match self.peek() {
				None => return None,
				Some(b')') => {
					self.pos += 1;

					break;
				},
				Some(b',') => self.pos += 1,
				_ => {
					let before = self.pos;

					args.push(self.parse_expr());

					if self.pos == before && !self.advance_token() {
						return None;
					}
				},
			}
		}

		Some((Span::new(start, self.pos), args))
	}

	fn try_parse_type_args(&mut self) -> Option<TypeArgs> {
		let checkpoint = self.pos;
		let start = self.pos;

		self.pos += 1;

		let mut args = Vec::new();

		loop {
			self.skip_trivia();

			if self.peek() == Some(b'>') {
				self.pos += 1;

				break;
			}

			let ty = self.scan_type(&[b','], false);

			if ty.span.is_empty() {
				self.pos = checkpoint;

				return None;
			}

			args.push(ty);

			self.skip_trivia();

			match self.peek() {
				Some(b',') => self.pos += 1,
				Some(b'>') => {
					self.pos += 1;

					break;
				},
				_ => {
					self.pos = checkpoint;

					return None;
				},
			}
		}

		// Only a call argument list may follow, otherwise this was a comparison.
		let mut probe = Parser { text: self.text, bytes: self.bytes, pos: self.pos };

		probe.skip_trivia();

		if probe.peek() != Some(b'(') {
			self.pos = checkpoint;

			return None;
		}

		Some(TypeArgs { span: Span::new(start, self.pos), args })
	}

	fn parse_primary(&mut self) -> Expr {
		let start = self.pos;

		match self.peek() {
			None => Expr::Raw(Span::new(start, start)),
			Some(b'(') => {
				self.pos += 1;
				self.skip_trivia();

				let inner = self.parse_expr();

				self.skip_trivia();

				if self.peek() == Some(b')') {
					self.pos += 1;
				}

				Expr::Paren(Box::new(ParenExpr { span: Span::new(start, self.pos), expr: inner }))
			},
			Some(b'{') => self.parse_object_lit(),
			Some(b'[') => self.parse_array_lit(),
			Some(b'"') | Some(b'\'') => match self.parse_string_lit() {
				Some(lit) => Expr::Str(lit),
				None => Expr::Raw(self.scan_raw_expr()),
			},
			Some(b'`') => match self.parse_template() {
				Some(template) => Expr::Template(template),
				None => Expr::Raw(self.scan_raw_expr()),
			},
			Some(b'<') => self.parse_jsx(),
			Some(ch) if ch.is_ascii_digit() => self.parse_number(),
			Some(b'.') if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) =>
				self.parse_number(),
			Some(b'+') | Some(b'-') =>
				if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) {
					self.parse_number()
				} else {
					Expr::Raw(self.scan_raw_expr())
				},
			_ =>
				if let Some(ident) = self.parse_ident() {
					match ident.name.as_str() {
						"true" | "false" => Expr::Bool(ident.span),
						"null" => Expr::Null(ident.span),
						_ => Expr::Ident(ident),
					}
				} else {
					Expr::Raw(self.scan_raw_expr())
				},
		}
	}

	fn parse_number(&mut self) -> Expr {
		let start = self.pos;

		if matches!(self.peek(), Some(b'+') | Some(b'-')) {
			self.pos += 1;
		}

		while let Some(ch) = self.peek() {
			if ch.is_ascii_alphanumeric() || ch == b'.' || ch == b'_' {
				self.pos += 1;
			} else {
				break;
			}
		}

		Expr::Num(Span::new(start, self.pos))
	}

	fn parse_object_lit(&mut self) -> Expr {
		let start = self.pos;

		self.pos += 1;

		let mut properties = Vec::new();

		loop {
			self.skip_trivia();

			match self.peek() {
				None => break,
				Some(b'}') => {
					self.pos += 1;

					break;
				},
				Some(b',') => self.pos += 1,
				_ => {
					let before = self.pos;

					match self.parse_object_prop() {
						Some(prop) => properties.push(prop),
						None => {
							self.scan_raw_expr();
						},
					}

					if self.pos == before && !self.advance_token() {
						break;
					}
				},
			}
		}

		Expr::Object(ObjectLit { span: Span::new(start, self.pos), properties })
	}

	fn parse_object_prop(&mut self) -> Option<ObjectProp> {
		// Spread properties stay opaque but the spread expression is walked.
		if self.rest().starts_with("...") {
			self.pos += 3;

			let value = self.parse_expr();

			return Some(ObjectProp { key: None, value: Some(value) });
		}

		let key = match self.peek()? {
			b'"' | b'\'' => Some(self.parse_string_lit()?.value),
			b'[' => {
				self.skip_balanced(b'[', b']');

				None
			},
			ch if ch.is_ascii_digit() => {
				let Expr::Num(span) = self.parse_number() else {
					return None;
				};

				Some(span.text(self.text).to_owned())
			},
			_ => Some(self.parse_ident()?.name),
		};

		self.skip_trivia();

		let value = match self.peek() {
			Some(b':') => {
				self.pos += 1;
				self.skip_trivia();

				Some(self.parse_expr())
			},
			Some(b'(') => {
				// Method shorthand.
				self.skip_balanced(b'(', b')');
				self.skip_trivia();

				if self.peek() == Some(b'{') {
					self.skip_balanced(b'{', b'}');
				}

				None
			},
			_ => None,
		};

		Some(ObjectProp { key, value })
	}

	fn parse_array_lit(&mut self) -> Expr {
		let start = self.pos;

		self.pos += 1;

		let mut elements = Vec::new();

		loop {
			self.skip_trivia();

			match self.peek() {
				None => break,
				Some(b']') => {
					self.pos += 1;

					break;
				},
				Some(b',') => self.pos += 1,
				_ => {
					let before = self.pos;

					elements.push(self.parse_expr());

					if self.pos == before && !self.advance_token() {
						break;
					}
				},
			}
		}

		Expr::Array(ArrayLit { span: Span::new(start, self.pos), elements })
	}

	fn parse_template(&mut self) -> Option<TemplateLit> {
		if self.peek() != Some(b'`') {
			return None;
		}

		let start = self.pos;

		self.pos += 1;

		let mut quasis = Vec::new();
		let mut exprs = Vec::new();
		let mut quasi_start = self.pos;

		loop {
			match self.peek() {
				None => {
					quasis.push(self.text.get(quasi_start..self.pos).unwrap_or("").to_owned());

					break;
				},
				Some(b'`') => {
					quasis.push(self.text.get(quasi_start..self.pos).unwrap_or("").to_owned());
					self.pos += 1;

					break;
				},
				Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
				Some(b'$') if self.peek_at(1) == Some(b'{') => {
					quasis.push(self.text.get(quasi_start..self.pos).unwrap_or("").to_owned());
					self.pos += 2;
					self.skip_trivia();

					let before = self.pos;

					exprs.push(self.parse_expr());

					if self.pos == before {
						self.advance_token();
					}

					self.skip_trivia();

					if self.peek() == Some(b'}') {
						self.pos += 1;
					}

					quasi_start = self.pos;
				},
				_ => self.pos += 1,
			}
		}

		Some(TemplateLit { span: Span::new(start, self.pos), quasis, exprs })
	}

	fn parse_jsx(&mut self) -> Expr {
		let start = self.pos;
		let mut depth = 0_i32;

		loop {
			match self.peek() {
				None => break,
				Some(b'{') => self.skip_balanced(b'{', b'}'),
				Some(b'<') =>
					if self.peek_at(1) == Some(b'/') {
						self.skip_jsx_tag();

						depth -= 1;

						if depth <= 0 {
							break;
						}
					} else {
						let self_closing = self.skip_jsx_tag();

						if self_closing {
							if depth == 0 {
								break;
							}
						} else {
							depth += 1;
						}
					},
				_ =>
					if !self.advance_token() {
						break;
					},
			}
		}

		Expr::Jsx(Span::new(start, self.pos))
	}

	fn skip_jsx_tag(&mut self) -> bool {
		self.pos += 1;

		let mut self_closing = false;

		loop {
			match self.peek() {
				None => break,
				Some(b'>') => {
					self.pos += 1;

					break;
				},
				Some(b'"') | Some(b'\'') => self.skip_string(),
				Some(b'{') => self.skip_balanced(b'{', b'}'),
				Some(b'/') => {
					if self.peek_at(1) == Some(b'>') {
						self_closing = true;
					}

					self.pos += 1;
				},
				_ => self.pos += 1,
			}
		}

		self_closing
	}

	fn binary_continues(&self) -> bool {
		let mut idx = self.pos;

		while matches!(self.bytes.get(idx), Some(b' ') | Some(b'\t')) {
			idx += 1;
		}

		match self.bytes.get(idx) {
			Some(b'+') | Some(b'-') | Some(b'*') | Some(b'/') | Some(b'%') | Some(b'&')
			| Some(b'|') | Some(b'^') | Some(b'?') | Some(b'<') | Some(b'>') => true,
			Some(b'=') => self.bytes.get(idx + 1) != Some(&b'>'),
			Some(b'!') => self.bytes.get(idx + 1) == Some(&b'='),
			_ => {
				let probe = Parser { text: self.text, bytes: self.bytes, pos: idx };

				probe.word_at("as")
					|| probe.word_at("instanceof")
					|| probe.word_at("in") || probe.word_at("satisfies")
			},
		}
	}

	fn scan_raw_expr(&mut self) -> Span {
		let start = self.pos;
		let mut last_significant = None;

		loop {
			match self.peek() {
				None => break,
				Some(b',') | Some(b';') | Some(b')') | Some(b']') | Some(b'}') => break,
				Some(b'(') => {
					self.skip_balanced(b'(', b')');

					last_significant = Some(b')');
				},
				Some(b'[') => {
					self.skip_balanced(b'[', b']');

					last_significant = Some(b']');
				},
				Some(b'{') => {
					self.skip_balanced(b'{', b'}');

					last_significant = Some(b'}');
				},
				Some(b'"') | Some(b'\'') => {
					self.skip_string();

					last_significant = Some(b'"');
				},
				Some(b'`') => {
					self.skip_template_raw();

					last_significant = Some(b'"');
				},
				Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
				Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
				Some(b'\n') => {
					if !self.raw_expr_continues_after_newline(last_significant) {
						break;
					}

					self.pos += 1;
				},
				Some(ch) => {
					if !ch.is_ascii_whitespace() {
						last_significant = Some(ch);
					}

					self.pos += 1;
				},
			}
		}

		let mut end = self.pos;

		while end > start && self.bytes[end - 1].is_ascii_whitespace() {
			end -= 1;
		}

		Span::new(start, end)
	}

	fn raw_expr_continues_after_newline(&self, last_significant: Option<u8>) -> bool {
		if last_significant.is_some_and(|ch| OPERATOR_BYTES.contains(&ch) || ch == b'(') {
			return true;
		}

		let mut probe = Parser { text: self.text, bytes: self.bytes, pos: self.pos };

		probe.skip_trivia();

		probe.peek().is_some_and(|ch| OPERATOR_BYTES.contains(&ch))
	}

	fn scan_type(&mut self, stops: &[u8], stop_at_arrow: bool) -> TypeExpr {
		let start = self.pos;
		let mut angle_depth = 0_i32;
		let mut group_depth = 0_i32;

		loop {
			match self.peek() {
				None => break,
				Some(b'(') | Some(b'[') | Some(b'{') => {
					group_depth += 1;
					self.pos += 1;
				},
				Some(b')') | Some(b']') | Some(b'}') => {
					if group_depth == 0 {
						break;
					}

					group_depth -= 1;
					self.pos += 1;
				},
				Some(b'<') => {
					angle_depth += 1;
					self.pos += 1;
				},
				Some(b'>') => {
					if angle_depth == 0 {
						break;
					}

					angle_depth -= 1;
					self.pos += 1;
				},
				Some(b'=') if self.peek_at(1) == Some(b'>') => {
					if stop_at_arrow && angle_depth == 0 && group_depth == 0 {
						break;
					}

					self.pos += 2;
				},
				Some(b';') => {
					if angle_depth == 0 && group_depth == 0 {
						break;
					}

					self.pos += 1;
				},
				Some(b'\n') if angle_depth == 0 && group_depth == 0 => break,
				Some(b'"') | Some(b'\'') => self.skip_string(),
				Some(b'`') => self.skip_template_raw(),
				Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
				Some(b'/') if self.peek_at(1) == Some(b'*') => self.skip_block_comment(),
				Some(ch) => {
					if angle_depth == 0 && group_depth == 0 && stops.contains(&ch) {
						break;
					}

					self.pos += 1;
				},
			}
		}

		let mut end = self.pos;

		while end > start && self.bytes[end - 1].is_ascii_whitespace() {
			end -= 1;
		}

		TypeExpr { span: Span::new(start, end) }
	}
}
