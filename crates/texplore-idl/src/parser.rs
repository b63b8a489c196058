//! Recursive-descent parser producing one file's declarations.

use texplore_core::PrimitiveKind;

use crate::error::IdlError;
use crate::lexer::{tokenize, Spanned, Token};

/// An unresolved type reference as written in source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypeRef {
    Base(PrimitiveKind),
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldDecl {
    pub id: i16,
    pub required: bool,
    pub ty: TypeRef,
    pub name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct EnumDecl {
    pub name: String,
    pub members: Vec<(String, i32)>,
}

#[derive(Debug, Clone)]
pub(crate) struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub(crate) struct MethodDecl {
    pub name: String,
    pub returns: Option<TypeRef>,
    pub args: Vec<FieldDecl>,
    pub throws: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub(crate) struct ServiceDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
}

/// Everything one file declares, includes still unresolved.
#[derive(Debug, Clone, Default)]
pub(crate) struct Document {
    pub includes: Vec<String>,
    pub typedefs: Vec<(String, TypeRef)>,
    pub enums: Vec<EnumDecl>,
    pub structs: Vec<StructDecl>,
    pub services: Vec<ServiceDecl>,
}

pub(crate) fn parse_document(file: &str, source: &str) -> Result<Document, IdlError> {
    let tokens = tokenize(file, source)?;
    let mut parser = Parser {
        file,
        tokens,
        pos: 0,
    };
    parser.document()
}

struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn document(&mut self) -> Result<Document, IdlError> {
        let mut doc = Document::default();
        while let Some(spanned) = self.peek().cloned() {
            match &spanned.token {
                Token::Ident(word) => match word.as_str() {
                    "include" => {
                        self.advance();
                        doc.includes.push(self.expect_string()?);
                    }
                    "namespace" => {
                        self.advance();
                        // scope then name; both irrelevant to the explorer
                        self.advance();
                        self.expect_ident()?;
                    }
                    "typedef" => {
                        self.advance();
                        let ty = self.type_ref()?;
                        let name = self.expect_ident()?;
                        self.skip_separator();
                        doc.typedefs.push((name, ty));
                    }
                    "const" => {
                        self.advance();
                        let _ty = self.type_ref()?;
                        let _name = self.expect_ident()?;
                        self.expect(Token::Equals)?;
                        self.skip_const_value()?;
                        self.skip_separator();
                    }
                    "enum" => doc.enums.push(self.enum_decl()?),
                    "struct" | "exception" => doc.structs.push(self.struct_decl()?),
                    "union" => {
                        return Err(self.error_at(spanned.line, "unions are not supported"))
                    }
                    "senum" => {
                        return Err(self.error_at(spanned.line, "senums are not supported"))
                    }
                    "service" => doc.services.push(self.service_decl()?),
                    other => {
                        return Err(
                            self.error_at(spanned.line, &format!("unexpected '{other}'"))
                        )
                    }
                },
                other => {
                    return Err(
                        self.error_at(spanned.line, &format!("unexpected token {other:?}"))
                    )
                }
            }
        }
        Ok(doc)
    }

    fn enum_decl(&mut self) -> Result<EnumDecl, IdlError> {
        self.advance(); // enum
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;
        let mut members = Vec::new();
        let mut next_value: i32 = 0;
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            let member = self.expect_ident()?;
            let value = if self.eat(Token::Equals) {
                let v = self.expect_int()?;
                i32::try_from(v).map_err(|_| {
                    self.error_here(&format!("enum value {v} does not fit an i32"))
                })?
            } else {
                next_value
            };
            next_value = value.saturating_add(1);
            members.push((member, value));
            self.skip_separator();
        }
        Ok(EnumDecl { name, members })
    }

    fn struct_decl(&mut self) -> Result<StructDecl, IdlError> {
        self.advance(); // struct or exception
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            fields.push(self.field_decl()?);
        }
        Ok(StructDecl { name, fields })
    }

    fn field_decl(&mut self) -> Result<FieldDecl, IdlError> {
        let id = self.expect_int()?;
        let id = i16::try_from(id)
            .map_err(|_| self.error_here(&format!("field id {id} does not fit an i16")))?;
        self.expect(Token::Colon)?;
        let required = match self.peek_ident() {
            Some("required") => {
                self.advance();
                true
            }
            Some("optional") => {
                self.advance();
                false
            }
            _ => false,
        };
        let ty = self.type_ref()?;
        let name = self.expect_ident()?;
        if self.eat(Token::Equals) {
            self.skip_const_value()?;
        }
        self.skip_separator();
        Ok(FieldDecl {
            id,
            required,
            ty,
            name,
        })
    }

    fn service_decl(&mut self) -> Result<ServiceDecl, IdlError> {
        self.advance(); // service
        let name = self.expect_ident()?;
        if self.peek_ident() == Some("extends") {
            return Err(self.error_here("service inheritance is not supported"));
        }
        self.expect(Token::LBrace)?;
        let mut methods = Vec::new();
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            methods.push(self.method_decl()?);
        }
        Ok(ServiceDecl { name, methods })
    }

    fn method_decl(&mut self) -> Result<MethodDecl, IdlError> {
        if self.peek_ident() == Some("oneway") {
            // fire-and-forget methods carry no result at all; for the
            // explorer that is the same as void
            self.advance();
        }
        let returns = if self.peek_ident() == Some("void") {
            self.advance();
            None
        } else {
            Some(self.type_ref()?)
        };
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        loop {
            if self.eat(Token::RParen) {
                break;
            }
            args.push(self.field_decl()?);
        }
        let mut throws = Vec::new();
        if self.peek_ident() == Some("throws") {
            self.advance();
            self.expect(Token::LParen)?;
            loop {
                if self.eat(Token::RParen) {
                    break;
                }
                throws.push(self.field_decl()?);
            }
        }
        self.skip_separator();
        Ok(MethodDecl {
            name,
            returns,
            args,
            throws,
        })
    }

    fn type_ref(&mut self) -> Result<TypeRef, IdlError> {
        let name = self.expect_ident()?;
        let base = match name.as_str() {
            "bool" => Some(PrimitiveKind::Bool),
            "byte" | "i8" => Some(PrimitiveKind::Byte),
            "i16" => Some(PrimitiveKind::I16),
            "i32" => Some(PrimitiveKind::I32),
            "i64" => Some(PrimitiveKind::I64),
            "double" => Some(PrimitiveKind::Double),
            "string" => Some(PrimitiveKind::String),
            "binary" => Some(PrimitiveKind::Binary),
            _ => None,
        };
        if let Some(kind) = base {
            return Ok(TypeRef::Base(kind));
        }
        match name.as_str() {
            "list" => {
                self.expect(Token::LAngle)?;
                let inner = self.type_ref()?;
                self.expect(Token::RAngle)?;
                Ok(TypeRef::List(Box::new(inner)))
            }
            "set" => {
                self.expect(Token::LAngle)?;
                let inner = self.type_ref()?;
                self.expect(Token::RAngle)?;
                Ok(TypeRef::Set(Box::new(inner)))
            }
            "map" => {
                self.expect(Token::LAngle)?;
                let key = self.type_ref()?;
                self.expect(Token::Comma)?;
                let value = self.type_ref()?;
                self.expect(Token::RAngle)?;
                Ok(TypeRef::Map(Box::new(key), Box::new(value)))
            }
            _ => Ok(TypeRef::Named(name)),
        }
    }

    /// Consume one const value: a literal, a reference, a list, or a map.
    /// Values never influence extraction, so the shape is checked and the
    /// content discarded.
    fn skip_const_value(&mut self) -> Result<(), IdlError> {
        match self.next_token()? {
            Token::IntLit(_) | Token::FloatLit(_) | Token::StringLit(_) | Token::Ident(_) => Ok(()),
            Token::LBracket => loop {
                if self.eat(Token::RBracket) {
                    return Ok(());
                }
                self.skip_const_value()?;
                self.skip_separator();
            },
            Token::LBrace => loop {
                if self.eat(Token::RBrace) {
                    return Ok(());
                }
                self.skip_const_value()?;
                self.expect(Token::Colon)?;
                self.skip_const_value()?;
                self.skip_separator();
            },
            other => Err(self.error_here(&format!("expected a const value, got {other:?}"))),
        }
    }

    // -- token plumbing ----------------------------------------------------

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Spanned {
                token: Token::Ident(s),
                ..
            }) => Some(s.as_str()),
            _ => None,
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn next_token(&mut self) -> Result<Token, IdlError> {
        let token = self
            .peek()
            .map(|s| s.token.clone())
            .ok_or_else(|| self.error_here("unexpected end of file"))?;
        self.advance();
        Ok(token)
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek().map(|s| &s.token) == Some(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_separator(&mut self) {
        while self.eat(Token::Comma) || self.eat(Token::Semi) {}
    }

    fn expect(&mut self, token: Token) -> Result<(), IdlError> {
        if self.eat(token.clone()) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected {token:?}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, IdlError> {
        match self.next_token()? {
            Token::Ident(s) => Ok(s),
            other => Err(self.error_here(&format!("expected an identifier, got {other:?}"))),
        }
    }

    fn expect_string(&mut self) -> Result<String, IdlError> {
        match self.next_token()? {
            Token::StringLit(s) => Ok(s),
            other => Err(self.error_here(&format!("expected a string literal, got {other:?}"))),
        }
    }

    fn expect_int(&mut self) -> Result<i64, IdlError> {
        match self.next_token()? {
            Token::IntLit(i) => Ok(i),
            other => Err(self.error_here(&format!("expected an integer, got {other:?}"))),
        }
    }

    fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|s| s.line)
            .unwrap_or(0)
    }

    fn error_here(&self, message: &str) -> IdlError {
        self.error_at(self.current_line(), message)
    }

    fn error_at(&self, line: u32, message: &str) -> IdlError {
        IdlError::Parse {
            file: self.file.to_string(),
            line,
            message: message.to_string(),
        }
    }
}
