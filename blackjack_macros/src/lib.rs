use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{self, Ident};

/// This macro is added before a method of `Game` struct in the impl block.
/// Use this macro to first check if current game phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(Dealt)]` will make a method first check
/// if current game phase is `Dealt`. If not, the method will return
/// `BlackjackError::WrongPhase` without touching any state.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phase: Ident = match syn::parse(attr) {
        Ok(phase) => phase,
        Err(err) => return err.to_compile_error().into(),
    };
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };
    let function_name = ast.sig.ident.to_string();

    let early_return = phase_guard(&phase, &function_name);
    let early_return: syn::Stmt = syn::parse2(early_return).unwrap();
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}

fn phase_guard(phase: &Ident, function_name: &str) -> TokenStream2 {
    quote! {
        if self.current_game_phase != GamePhase::#phase {
            return Err(crate::BlackjackError::WrongPhase {
                operation: #function_name,
                expected: GamePhase::#phase,
                actual: self.current_game_phase,
            });
        }
    }
}
