//! Bindings for the token and Uniswap V2 style contracts.
//!
//! Only the functions the dashboard calls are declared. The token contract is
//! the ownable, mintable and burnable `MockERC20` used on the test networks;
//! plain ERC-20 tokens answer the same view functions but revert on `owner`,
//! `mint` and `burn`.

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MockERC20 {
        constructor(string name, string symbol, uint256 initialSupply);

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function owner() external view returns (address);

        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
        function burn(uint256 amount) external;
    }
}

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract UniswapV2Factory {
        event PairCreated(address indexed token0, address indexed token1, address pair, uint256 pairCount);

        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function createPair(address tokenA, address tokenB) external returns (address pair);
    }
}

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract UniswapV2Router {
        constructor(address factory);

        function addLiquidity(
            address tokenA,
            address tokenB,
            uint256 amountADesired,
            uint256 amountBDesired,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external
            view
            returns (uint256[] memory amounts);

        function getAmountsIn(uint256 amountOut, address[] calldata path)
            external
            view
            returns (uint256[] memory amounts);
    }
}

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract UniswapV2Pair {
        function getReserves()
            external
            view
            returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Address, U256},
            sol_types::{SolCall, SolConstructor, SolEvent},
        },
        hex_literal::hex,
    };

    #[test]
    fn selectors() {
        assert_eq!(MockERC20::mintCall::SELECTOR, hex!("40c10f19"));
        assert_eq!(MockERC20::burnCall::SELECTOR, hex!("42966c68"));
        assert_eq!(MockERC20::approveCall::SELECTOR, hex!("095ea7b3"));
        assert_eq!(UniswapV2Factory::getPairCall::SELECTOR, hex!("e6a43905"));
        assert_eq!(UniswapV2Router::addLiquidityCall::SELECTOR, hex!("e8e33700"));
        assert_eq!(
            UniswapV2Router::swapExactTokensForTokensCall::SELECTOR,
            hex!("38ed1739")
        );
        assert_eq!(UniswapV2Router::getAmountsOutCall::SELECTOR, hex!("d06ca61f"));
        assert_eq!(UniswapV2Pair::getReservesCall::SELECTOR, hex!("0902f1ac"));
    }

    #[test]
    fn pair_created_topic() {
        assert_eq!(
            UniswapV2Factory::PairCreated::SIGNATURE_HASH.0,
            hex!("0d3648bd0f6ba80134a33ba9275ac585d9d315f0ad8355cddefde31afa28d0e9")
        );
    }

    #[test]
    fn encodes_router_constructor() {
        let factory = Address::repeat_byte(0x11);
        let encoded = UniswapV2Router::constructorCall { factory }.abi_encode();
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[12..], factory.as_slice());

        let token = MockERC20::constructorCall {
            name: "Token".to_owned(),
            symbol: "TKN".to_owned(),
            initialSupply: U256::from(1),
        }
        .abi_encode();
        // three head words followed by two length-prefixed strings
        assert_eq!(token.len(), 32 * 7);
    }
}
